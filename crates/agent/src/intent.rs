//! Intent classification
//!
//! Maps a raw user utterance to exactly one [`ReplyIntent`] by evaluating an
//! ordered list of keyword-set tests and returning the first match. The
//! ordering is a design decision, not incidental: pricing is tested before
//! process, before greeting, before contact, before each service name,
//! before the pack test, so a message with several cues resolves to the most
//! commercially important intent. A price question about a specific service
//! still gets the price answer.
//!
//! Keyword tests are case-insensitive substring checks; no stemming, no
//! fuzzy matching, no side effects.

use std::sync::Arc;

use lead_desk_config::Catalog;
use lead_desk_core::ServiceType;

/// The classified purpose of a chat message. Derived purely from text,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyIntent {
    Pricing,
    Process,
    Greeting,
    Contact,
    Service(ServiceType),
    Pack,
    Empty,
    Unknown,
}

/// Keyword intent classifier over the catalog's static tables.
#[derive(Clone)]
pub struct IntentClassifier {
    catalog: Arc<Catalog>,
}

impl IntentClassifier {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Classify one utterance. Empty text short-circuits before any
    /// keyword test runs.
    pub fn classify(&self, text: &str) -> ReplyIntent {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return ReplyIntent::Empty;
        }

        let catalog = &self.catalog;
        if contains_any(&text, &catalog.pricing_keywords) {
            return ReplyIntent::Pricing;
        }
        if contains_any(&text, &catalog.process_keywords) {
            return ReplyIntent::Process;
        }
        if contains_any(&text, &catalog.greeting_keywords) {
            return ReplyIntent::Greeting;
        }
        if contains_any(&text, &catalog.contact_keywords) {
            return ReplyIntent::Contact;
        }
        for service in ServiceType::single_services() {
            if contains_any(&text, catalog.keywords_for_service(&service)) {
                return ReplyIntent::Service(service);
            }
        }
        if contains_any(&text, &catalog.pack_keywords) {
            return ReplyIntent::Pack;
        }

        ReplyIntent::Unknown
    }

    /// True when the text mentions any recognized service-name keyword.
    /// Used by the guard's off-topic rule.
    pub fn mentions_service(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.catalog
            .all_service_keywords()
            .any(|keyword| text.contains(keyword))
    }
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(Arc::new(Catalog::default()))
    }

    #[test]
    fn test_empty_short_circuits() {
        let c = classifier();
        assert_eq!(c.classify(""), ReplyIntent::Empty);
        assert_eq!(c.classify("   "), ReplyIntent::Empty);
    }

    #[test]
    fn test_basic_intents() {
        let c = classifier();
        assert_eq!(c.classify("Quels sont vos prix"), ReplyIntent::Pricing);
        assert_eq!(c.classify("Comment ca fonctionne"), ReplyIntent::Process);
        assert_eq!(c.classify("Bonjour"), ReplyIntent::Greeting);
        assert_eq!(c.classify("votre numero whatsapp"), ReplyIntent::Contact);
        assert_eq!(c.classify("une formule complete"), ReplyIntent::Pack);
        assert_eq!(c.classify("pouvez-vous coder un jeu video"), ReplyIntent::Unknown);
    }

    #[test]
    fn test_service_intents() {
        let c = classifier();
        assert_eq!(
            c.classify("je veux un portfolio"),
            ReplyIntent::Service(ServiceType::Portfolio)
        );
        assert_eq!(
            c.classify("refaire mon cv"),
            ReplyIntent::Service(ServiceType::Cv)
        );
        assert_eq!(
            c.classify("une lettre de motivation"),
            ReplyIntent::Service(ServiceType::Lettre)
        );
        assert_eq!(
            c.classify("un site vitrine pour ma boutique"),
            ReplyIntent::Service(ServiceType::Vitrine)
        );
    }

    #[test]
    fn test_pricing_wins_over_service_name() {
        let c = classifier();
        // A price question about a specific service still gets the price
        // answer.
        assert_eq!(c.classify("combien pour un portfolio"), ReplyIntent::Pricing);
        assert_eq!(c.classify("tarif du cv"), ReplyIntent::Pricing);
    }

    #[test]
    fn test_process_wins_over_service_name() {
        let c = classifier();
        assert_eq!(
            c.classify("comment se passe la creation du portfolio"),
            ReplyIntent::Process
        );
    }

    #[test]
    fn test_single_service_no_pricing_keyword() {
        let c = classifier();
        let intent = c.classify("il me faut un portfolio moderne");
        assert_eq!(intent, ReplyIntent::Service(ServiceType::Portfolio));
    }

    #[test]
    fn test_mentions_service() {
        let c = classifier();
        assert!(c.mentions_service("je veux un CV"));
        assert!(c.mentions_service("un site vitrine"));
        assert!(!c.mentions_service("bonjour, vous allez bien ?"));
    }
}
