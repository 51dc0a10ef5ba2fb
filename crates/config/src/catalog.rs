//! Immutable business catalog
//!
//! Single source of truth for the business data the rest of the system
//! reads: prices, the fixed exchange rate, the contact channel, the process
//! steps, intent keyword tables, required-field sets and their human labels.
//! Built into the binary, optionally overridden from a YAML file at startup,
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use lead_desk_core::ServiceType;

use crate::ConfigError;

/// Fixed CFA per USD conversion rate used for displayed prices.
pub const FX_RATE_CFA_PER_USD: u64 = 600;

/// Public WhatsApp contact channel.
pub const WHATSAPP_URL: &str = "https://wa.me/22892092572";

/// Substring every compliant reply must contain.
pub const FOOTER_MARKER: &str = "wa.me/22892092572";

/// Footer line appended to every chat reply.
pub const CONTACT_FOOTER: &str =
    "Contactez-nous sur WhatsApp: https://wa.me/22892092572";

/// Substring every rendered price contains.
pub const CURRENCY_MARKER: &str = "CFA";

/// Literal the canned process text always starts its list with.
pub const STEP_ONE_MARKER: &str = "1.";

/// Prefix of every clarification prompt.
pub const CLARIFICATION_PREFIX: &str = "Merci de preciser: ";

/// Quality score below which the clarification flow is triggered. Fixed
/// business rule, identical for every service type.
pub const CLARIFICATION_THRESHOLD: u8 = 60;

/// The fixed 4-step process, identical in every context that needs it.
pub const PROCESS_STEPS: [&str; 4] = [
    "Vous envoyez un brief detaille.",
    "Nous validons la cible, l'objectif et le positionnement.",
    "Nous concevons la structure et les textes.",
    "Livraison rapide + ajustements.",
];

/// Render a CFA amount with its USD equivalent: `"29 900 CFA (~$49.83)"`.
///
/// This is the only price formatter in the codebase; the chat replies, the
/// email body and the price listing all go through it.
pub fn format_price(cfa: u64) -> String {
    let usd = cfa as f64 / FX_RATE_CFA_PER_USD as f64;
    format!("{} CFA (~${:.2})", group_thousands(cfa), usd)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    grouped
}

/// Service and hosting prices, in CFA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTable {
    pub portfolio: u64,
    pub vitrine: u64,
    pub cv: u64,
    pub lettre: u64,
    pub pack: u64,
    pub hosting_month: u64,
    pub hosting_year: u64,
    /// Discounted annual offer
    pub hosting_year_discount: u64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            portfolio: 29_900,
            vitrine: 49_900,
            cv: 9_900,
            lettre: 4_900,
            pack: 12_900,
            hosting_month: 2_000,
            hosting_year: 24_000,
            hosting_year_discount: 19_900,
        }
    }
}

impl PriceTable {
    pub fn for_service(&self, service: &ServiceType) -> Option<u64> {
        match service {
            ServiceType::Portfolio => Some(self.portfolio),
            ServiceType::Vitrine => Some(self.vitrine),
            ServiceType::Cv => Some(self.cv),
            ServiceType::Lettre => Some(self.lettre),
            ServiceType::Pack => Some(self.pack),
            ServiceType::Other(_) => None,
        }
    }
}

/// The immutable business catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub prices: PriceTable,

    /// Required field keys per service type, in declaration order.
    #[serde(default = "default_required_fields")]
    pub required_fields: BTreeMap<String, Vec<String>>,

    /// Human labels for field keys.
    #[serde(default = "default_field_labels")]
    pub field_labels: BTreeMap<String, String>,

    // Intent keyword tables. Case-insensitive substring tests; order of the
    // tables (not of the keywords) decides precedence.
    #[serde(default = "default_pricing_keywords")]
    pub pricing_keywords: Vec<String>,
    #[serde(default = "default_process_keywords")]
    pub process_keywords: Vec<String>,
    #[serde(default = "default_greeting_keywords")]
    pub greeting_keywords: Vec<String>,
    #[serde(default = "default_contact_keywords")]
    pub contact_keywords: Vec<String>,
    /// Keyed by canonical service name, tested in catalog order.
    #[serde(default = "default_service_keywords")]
    pub service_keywords: BTreeMap<String, Vec<String>>,
    #[serde(default = "default_pack_keywords")]
    pub pack_keywords: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            prices: PriceTable::default(),
            required_fields: default_required_fields(),
            field_labels: default_field_labels(),
            pricing_keywords: default_pricing_keywords(),
            process_keywords: default_process_keywords(),
            greeting_keywords: default_greeting_keywords(),
            contact_keywords: default_contact_keywords(),
            service_keywords: default_service_keywords(),
            pack_keywords: default_pack_keywords(),
        }
    }
}

impl Catalog {
    /// Load a catalog override from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path.display().to_string()))?;
        let catalog: Catalog = serde_yaml::from_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded business catalog override");
        Ok(catalog)
    }

    /// Required field keys for a service type, in declaration order.
    /// Unknown service types have no required fields.
    pub fn required_fields(&self, service: &ServiceType) -> &[String] {
        self.required_fields
            .get(service.canonical_name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human label for a field key, falling back to the raw key.
    pub fn label_or_key<'a>(&'a self, key: &'a str) -> &'a str {
        self.field_labels.get(key).map(String::as_str).unwrap_or(key)
    }

    /// Keywords for one service, in catalog declaration order.
    pub fn keywords_for_service(&self, service: &ServiceType) -> &[String] {
        self.service_keywords
            .get(service.canonical_name())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every recognized service-name keyword, used by the guard's
    /// off-topic check.
    pub fn all_service_keywords(&self) -> impl Iterator<Item = &str> {
        ServiceType::single_services()
            .into_iter()
            .flat_map(move |service| {
                self.service_keywords
                    .get(service.canonical_name())
                    .map(Vec::as_slice)
                    .unwrap_or(&[])
                    .iter()
                    .map(String::as_str)
            })
    }

    /// Verbatim list of supported categories for the redirect reply.
    pub fn supported_services_line(&self) -> String {
        let services = ServiceType::single_services();
        let mut names: Vec<String> = services
            .iter()
            .map(|s| s.display_name().to_string())
            .collect();
        names.push(ServiceType::Pack.display_name().to_string());
        names.join(", ")
    }
}

fn default_required_fields() -> BTreeMap<String, Vec<String>> {
    let owned = |keys: &[&str]| keys.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            "portfolio".to_string(),
            owned(&[
                "full_name",
                "phone",
                "email",
                "objective",
                "role",
                "deadline",
                "need",
                "consent",
            ]),
        ),
        (
            "vitrine".to_string(),
            owned(&[
                "full_name",
                "phone",
                "email",
                "business_name",
                "objective",
                "deadline",
                "need",
                "consent",
            ]),
        ),
        (
            "cv".to_string(),
            owned(&[
                "full_name",
                "phone",
                "email",
                "role",
                "experience",
                "deadline",
                "consent",
            ]),
        ),
        (
            "lettre".to_string(),
            owned(&[
                "full_name",
                "phone",
                "email",
                "role",
                "company",
                "deadline",
                "consent",
            ]),
        ),
        (
            "pack".to_string(),
            owned(&[
                "full_name",
                "phone",
                "email",
                "role",
                "experience",
                "company",
                "deadline",
                "consent",
            ]),
        ),
    ])
}

fn default_field_labels() -> BTreeMap<String, String> {
    BTreeMap::from(
        [
            ("full_name", "Nom complet"),
            ("phone", "WhatsApp/Telephone"),
            ("email", "Email"),
            ("objective", "Objectif"),
            ("role", "Poste vise"),
            ("deadline", "Delai"),
            ("need", "Contexte et objectifs"),
            ("consent", "Consentement"),
            ("business_name", "Nom de l'activite"),
            ("experience", "Experiences"),
            ("company", "Entreprise visee"),
        ]
        .map(|(k, v)| (k.to_string(), v.to_string())),
    )
}

fn owned_list(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_pricing_keywords() -> Vec<String> {
    owned_list(&[
        "prix", "tarif", "combien", "cout", "coute", "devis", "budget", "price", "cfa",
    ])
}

fn default_process_keywords() -> Vec<String> {
    owned_list(&[
        "comment",
        "etape",
        "processus",
        "fonctionne",
        "deroulement",
        "livraison",
    ])
}

fn default_greeting_keywords() -> Vec<String> {
    owned_list(&["bonjour", "bonsoir", "salut", "hello", "coucou"])
}

fn default_contact_keywords() -> Vec<String> {
    owned_list(&[
        "contact", "whatsapp", "joindre", "appeler", "numero", "telephone",
    ])
}

fn default_service_keywords() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "portfolio".to_string(),
            owned_list(&["portfolio", "portofolio"]),
        ),
        (
            "vitrine".to_string(),
            owned_list(&["vitrine", "site web", "site internet"]),
        ),
        ("cv".to_string(), owned_list(&["cv", "curriculum"])),
        ("lettre".to_string(), owned_list(&["lettre", "motivation"])),
    ])
}

fn default_pack_keywords() -> Vec<String> {
    owned_list(&["pack", "combo", "formule"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_exact() {
        assert_eq!(format_price(29_900), "29 900 CFA (~$49.83)");
        assert_eq!(format_price(2_000), "2 000 CFA (~$3.33)");
        assert_eq!(format_price(24_000), "24 000 CFA (~$40.00)");
        assert_eq!(format_price(19_900), "19 900 CFA (~$33.17)");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1 000");
        assert_eq!(group_thousands(1_234_567), "1 234 567");
    }

    #[test]
    fn test_cv_required_field_order() {
        let catalog = Catalog::default();
        let keys = catalog.required_fields(&ServiceType::Cv);
        assert_eq!(
            keys,
            ["full_name", "phone", "email", "role", "experience", "deadline", "consent"]
        );
    }

    #[test]
    fn test_unknown_service_has_no_required_fields() {
        let catalog = Catalog::default();
        let other = ServiceType::Other("xz".to_string());
        assert!(catalog.required_fields(&other).is_empty());
        assert!(catalog.prices.for_service(&other).is_none());
    }

    #[test]
    fn test_label_fallback() {
        let catalog = Catalog::default();
        assert_eq!(catalog.label_or_key("phone"), "WhatsApp/Telephone");
        assert_eq!(catalog.label_or_key("consent"), "Consentement");
        assert_eq!(catalog.label_or_key("mystery_key"), "mystery_key");
    }

    #[test]
    fn test_service_keyword_lookup() {
        let catalog = Catalog::default();
        assert!(catalog
            .keywords_for_service(&ServiceType::Lettre)
            .contains(&"motivation".to_string()));
        let all: Vec<&str> = catalog.all_service_keywords().collect();
        assert!(all.contains(&"portfolio"));
        assert!(all.contains(&"vitrine"));
        assert!(all.contains(&"cv"));
        assert!(all.contains(&"lettre"));
    }

    #[test]
    fn test_supported_services_line() {
        let catalog = Catalog::default();
        let line = catalog.supported_services_line();
        assert!(line.contains("portfolio"));
        assert!(line.contains("site vitrine"));
        assert!(line.contains("CV"));
        assert!(line.contains("lettre de motivation"));
        assert!(line.contains("pack"));
    }
}
