//! Model-reply guard
//!
//! A hosted model is non-deterministic and is never trusted to enforce
//! business-critical facts: prices, the contact channel, staying on topic.
//! The guard is an explicit ordered list of rules, each a pure function of
//! `(user text, candidate reply)` returning an optional replacement. Rules
//! run in a fixed sequence until one produces a replacement or the list is
//! exhausted; the footer check then repairs rather than replaces. The
//! precedence order is auditable here and each rule is testable on its own.

use std::sync::Arc;

use lead_desk_config::{Catalog, CURRENCY_MARKER, STEP_ONE_MARKER};

use crate::canned::CannedResponder;
use crate::intent::{IntentClassifier, ReplyIntent};

/// One guard rule: may force a full replacement of the candidate reply.
struct GuardRule {
    name: &'static str,
    check: fn(&ReplyGuard, &str, &ReplyIntent, &str) -> Option<String>,
}

/// Validates a model-generated reply against the business-policy
/// invariants, substituting the canned reply on violation.
#[derive(Clone)]
pub struct ReplyGuard {
    classifier: IntentClassifier,
    responder: CannedResponder,
}

/// Ordered rule list. Rule 1 (failed or empty model call) is handled before
/// the list runs, since there is no candidate text to inspect.
const RULES: &[GuardRule] = &[
    GuardRule {
        name: "off_topic_service",
        check: ReplyGuard::check_off_topic,
    },
    GuardRule {
        name: "process_steps_present",
        check: ReplyGuard::check_process_steps,
    },
    GuardRule {
        name: "pricing_currency_present",
        check: ReplyGuard::check_pricing_currency,
    },
];

impl ReplyGuard {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            classifier: IntentClassifier::new(catalog.clone()),
            responder: CannedResponder::new(catalog),
        }
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn responder(&self) -> &CannedResponder {
        &self.responder
    }

    /// Decide the final reply for a user message.
    ///
    /// `candidate` is the model output, `None` when the call failed. Any
    /// model exception is caught at the call site and arrives here as
    /// `None`, which triggers the canned reply for the classified intent.
    /// The returned text is always non-empty and always carries the footer.
    pub fn review(&self, user_text: &str, candidate: Option<String>) -> String {
        let intent = self.classifier.classify(user_text);

        // Rule 1: failed or empty model reply
        let Some(reply) = candidate.filter(|text| !text.trim().is_empty()) else {
            tracing::debug!(?intent, "No usable model reply, using canned reply");
            return self.responder.reply(&intent);
        };

        let mut reply = reply;
        for rule in RULES {
            if let Some(replacement) = (rule.check)(self, user_text, &intent, &reply) {
                tracing::debug!(rule = rule.name, ?intent, "Guard overrode model reply");
                reply = replacement;
                break;
            }
        }

        // Rule 5: repair, not replace. Keep the model's phrasing and
        // append the missing footer.
        CannedResponder::ensure_footer(&reply)
    }

    /// Rule 2: the user asked about a recognized service but the reply
    /// mentions none of the recognized service names, so the model likely
    /// answered off-topic.
    fn check_off_topic(
        &self,
        user_text: &str,
        intent: &ReplyIntent,
        reply: &str,
    ) -> Option<String> {
        if self.classifier.mentions_service(user_text) && !self.classifier.mentions_service(reply)
        {
            return Some(self.responder.reply(intent));
        }
        None
    }

    /// Rule 3: a process question must be answered with the numbered steps.
    fn check_process_steps(
        &self,
        _user_text: &str,
        intent: &ReplyIntent,
        reply: &str,
    ) -> Option<String> {
        if *intent == ReplyIntent::Process && !reply.contains(STEP_ONE_MARKER) {
            return Some(self.responder.reply(&ReplyIntent::Process));
        }
        None
    }

    /// Rule 4: a pricing question must be answered with the price table.
    fn check_pricing_currency(
        &self,
        _user_text: &str,
        intent: &ReplyIntent,
        reply: &str,
    ) -> Option<String> {
        if *intent == ReplyIntent::Pricing && !reply.contains(CURRENCY_MARKER) {
            return Some(self.responder.reply(&ReplyIntent::Pricing));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_desk_config::FOOTER_MARKER;

    fn guard() -> ReplyGuard {
        ReplyGuard::new(Arc::new(Catalog::default()))
    }

    #[test]
    fn test_failed_model_call_yields_canned_pricing() {
        // A model exception is caught at the call site and arrives as None.
        let reply = guard().review("quels sont vos prix", None);
        assert!(reply.contains("CFA"));
        assert!(reply.contains(FOOTER_MARKER));
        assert!(!reply.trim().is_empty());
    }

    #[test]
    fn test_empty_model_reply_is_treated_as_failed() {
        let reply = guard().review("bonjour", Some("   ".to_string()));
        assert!(reply.contains(FOOTER_MARKER));
        assert!(reply.to_lowercase().contains("bonjour"));
    }

    #[test]
    fn test_off_topic_reply_is_replaced() {
        let reply = guard().review(
            "je veux un portfolio",
            Some("Nous vendons aussi des voitures d'occasion.".to_string()),
        );
        // Off-topic model text is discarded for the canned service reply.
        assert!(reply.contains("portfolio"));
        assert!(reply.contains("29 900 CFA (~$49.83)"));
    }

    #[test]
    fn test_on_topic_service_reply_is_kept() {
        let model_text =
            "Un portfolio vous aide a convaincre des recruteurs. Voulez-vous un devis ?";
        let reply = guard().review("je veux un portfolio", Some(model_text.to_string()));
        // The guard never substitutes a model reply that mentions the
        // requested service; it only appends the footer.
        assert!(reply.starts_with(model_text));
        assert!(reply.contains(FOOTER_MARKER));
    }

    #[test]
    fn test_process_reply_without_steps_is_replaced() {
        let reply = guard().review(
            "comment ca fonctionne",
            Some("C'est tres simple, on s'occupe de tout.".to_string()),
        );
        assert!(reply.contains("1. Vous envoyez un brief detaille."));
    }

    #[test]
    fn test_process_reply_with_steps_is_kept() {
        let model_text = "1. Brief. 2. Validation. 3. Conception. 4. Livraison.";
        let reply = guard().review("comment ca fonctionne", Some(model_text.to_string()));
        assert!(reply.starts_with(model_text));
    }

    #[test]
    fn test_pricing_reply_without_currency_is_replaced() {
        let reply = guard().review(
            "combien ca coute",
            Some("C'est tres abordable, faites-nous confiance.".to_string()),
        );
        assert!(reply.contains("CFA"));
        assert!(reply.contains("29 900 CFA (~$49.83)"));
    }

    #[test]
    fn test_pricing_reply_with_currency_is_kept() {
        let model_text = "Le portfolio est a 29 900 CFA (~$49.83), un excellent rapport qualite-prix.";
        let reply = guard().review("combien ca coute", Some(model_text.to_string()));
        assert!(reply.starts_with(model_text));
    }

    #[test]
    fn test_footer_is_appended_not_destructive() {
        let model_text = "Bonjour ! Je peux vous aider sur nos services.";
        let reply = guard().review("bonjour", Some(model_text.to_string()));
        assert!(reply.starts_with(model_text));
        assert!(reply.contains(FOOTER_MARKER));
    }

    #[test]
    fn test_reply_with_footer_is_untouched() {
        let model_text =
            "Bonjour ! Ecrivez-nous sur https://wa.me/22892092572 pour un devis.".to_string();
        let reply = guard().review("bonjour", Some(model_text.clone()));
        assert_eq!(reply, model_text);
    }
}
