//! Canned reply generation
//!
//! Deterministic, policy-compliant replies for each intent. Prices go
//! through the shared formatter, the process text is the fixed 4-step list,
//! and every branch passes through [`CannedResponder::ensure_footer`] so no
//! reply leaves without the contact channel.

use std::sync::Arc;

use lead_desk_config::{format_price, Catalog, CONTACT_FOOTER, FOOTER_MARKER, PROCESS_STEPS};
use lead_desk_core::ServiceType;

use crate::intent::ReplyIntent;

/// Deterministic reply generator.
#[derive(Clone)]
pub struct CannedResponder {
    catalog: Arc<Catalog>,
}

impl CannedResponder {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Complete, immediately sendable reply for an intent.
    pub fn reply(&self, intent: &ReplyIntent) -> String {
        let body = match intent {
            ReplyIntent::Pricing => self.pricing_text(),
            ReplyIntent::Process => self.process_text(),
            ReplyIntent::Greeting => self.greeting_text(),
            ReplyIntent::Contact => self.contact_text(),
            ReplyIntent::Service(service) => self.service_text(service),
            ReplyIntent::Pack => self.pack_text(),
            ReplyIntent::Empty => {
                "Posez votre question sur nos services, les prix ou le fonctionnement."
                    .to_string()
            }
            ReplyIntent::Unknown => self.redirect_text(),
        };

        Self::ensure_footer(&body)
    }

    /// Append the fixed contact footer unless the text already carries it.
    pub fn ensure_footer(text: &str) -> String {
        if text.contains(FOOTER_MARKER) {
            text.to_string()
        } else {
            format!("{}\n\n{}", text.trim_end(), CONTACT_FOOTER)
        }
    }

    /// The full price table, rendered with the shared formatter.
    pub fn pricing_text(&self) -> String {
        let prices = &self.catalog.prices;
        format!(
            "Nos tarifs:\n\
             - Portfolio: {portfolio}\n\
             - Site vitrine: {vitrine}\n\
             - CV: {cv}\n\
             - Lettre de motivation: {lettre}\n\
             - Pack CV + lettre: {pack}\n\
             - Hebergement: {hosting_month} / mois\n\
             - Hebergement annuel: {hosting_year}\n\
             - Offre annuelle: {hosting_discount}",
            portfolio = format_price(prices.portfolio),
            vitrine = format_price(prices.vitrine),
            cv = format_price(prices.cv),
            lettre = format_price(prices.lettre),
            pack = format_price(prices.pack),
            hosting_month = format_price(prices.hosting_month),
            hosting_year = format_price(prices.hosting_year),
            hosting_discount = format_price(prices.hosting_year_discount),
        )
    }

    /// The fixed 4-step numbered list, identical everywhere it is shown.
    pub fn process_text(&self) -> String {
        let steps = PROCESS_STEPS
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect::<Vec<_>>()
            .join("\n");
        format!("Comment ca se passe:\n{}", steps)
    }

    fn greeting_text(&self) -> String {
        "Bonjour ! Je peux vous renseigner sur nos services, les prix et le fonctionnement. \
         Quelle est votre question ?"
            .to_string()
    }

    fn contact_text(&self) -> String {
        // The footer itself is the answer here; ensure_footer keeps it single.
        "Le plus simple est de nous ecrire directement sur WhatsApp.".to_string()
    }

    fn service_text(&self, service: &ServiceType) -> String {
        let description = match service {
            ServiceType::Portfolio => {
                "Un portfolio premium, clair et professionnel, oriente conversion \
                 (preuves, projets, contact)."
            }
            ServiceType::Vitrine => {
                "Un site vitrine moderne pour presenter votre activite et inspirer \
                 confiance en quelques secondes."
            }
            ServiceType::Cv => {
                "Un CV repositionne pour le poste vise, clair et percutant."
            }
            ServiceType::Lettre => {
                "Une lettre de motivation ciblee sur l'entreprise et le poste."
            }
            ServiceType::Pack => return self.pack_text(),
            // The classifier never produces Other; redirect if it appears.
            ServiceType::Other(_) => return self.redirect_text(),
        };

        match self.catalog.prices.for_service(service) {
            Some(price) => format!(
                "{}\nTarif {}: {}.",
                description,
                service.display_name(),
                format_price(price)
            ),
            None => description.to_string(),
        }
    }

    fn pack_text(&self) -> String {
        format!(
            "Le pack CV + lettre de motivation couvre les deux documents, \
             coherents entre eux. Tarif: {}.",
            format_price(self.catalog.prices.pack)
        )
    }

    /// Generic redirect naming the supported categories verbatim, never an
    /// invented capability.
    fn redirect_text(&self) -> String {
        format!(
            "Nous proposons: {}. Posez votre question sur l'un de ces services, \
             les prix ou le fonctionnement.",
            self.catalog.supported_services_line()
        )
    }
}
