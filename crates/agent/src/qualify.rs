//! Required-field resolution
//!
//! Given a service type and submitted field data, returns the ordered list
//! of missing required field keys and the parallel human-readable
//! clarification prompts. "Missing" is decided by the single emptiness
//! predicate on [`lead_desk_core::FieldValue`]; a field explicitly set to a
//! non-empty falsy-looking value (the string `"0"`, an explicit `false`) is
//! NOT missing.

use std::sync::Arc;

use lead_desk_config::{Catalog, CLARIFICATION_PREFIX, CLARIFICATION_THRESHOLD};
use lead_desk_core::{LeadFields, ServiceType};

/// Missing required fields with their clarification prompts, both in
/// required-field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MissingFields {
    pub keys: Vec<String>,
    pub questions: Vec<String>,
}

impl MissingFields {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Pure resolver over the catalog's required-field and label tables.
#[derive(Clone)]
pub struct RequiredFieldResolver {
    catalog: Arc<Catalog>,
}

impl RequiredFieldResolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// Resolve the missing fields for one submission. Pure function of
    /// `(service_type, fields)`: resolving twice yields identical lists.
    pub fn resolve(&self, service: &ServiceType, fields: &LeadFields) -> MissingFields {
        let mut missing = MissingFields::default();

        for key in self.catalog.required_fields(service) {
            if fields.is_blank(key) {
                missing.keys.push(key.clone());
                missing.questions.push(format!(
                    "{}{}",
                    CLARIFICATION_PREFIX,
                    self.catalog.label_or_key(key)
                ));
            }
        }

        missing
    }
}

/// Threshold policy: a score below 60 triggers the clarification flow
/// (questions only, the full plan withheld). Fixed business rule,
/// independent of the service type's field-set size.
pub fn needs_clarification(score: u8) -> bool {
    score < CLARIFICATION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolver() -> RequiredFieldResolver {
        RequiredFieldResolver::new(Arc::new(Catalog::default()))
    }

    fn fields(value: serde_json::Value) -> LeadFields {
        LeadFields::from_json_map(value.as_object().unwrap())
    }

    #[test]
    fn test_cv_missing_phone_and_consent() {
        let data = fields(json!({
            "full_name": "Ama K.",
            "email": "ama@example.com",
            "role": "Data analyst",
            "experience": "3 ans chez Acme",
            "deadline": "72h",
        }));
        let missing = resolver().resolve(&ServiceType::Cv, &data);
        assert_eq!(missing.keys, ["phone", "consent"]);
        assert_eq!(
            missing.questions,
            [
                "Merci de preciser: WhatsApp/Telephone",
                "Merci de preciser: Consentement"
            ]
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let data = fields(json!({"full_name": "Ama K."}));
        let r = resolver();
        let first = r.resolve(&ServiceType::Portfolio, &data);
        let second = r.resolve(&ServiceType::Portfolio, &data);
        assert_eq!(first, second);
    }

    #[test]
    fn test_whitespace_is_missing_zero_is_not() {
        let data = fields(json!({
            "full_name": "   ",
            "phone": "0",
            "email": "a@b.c",
            "role": "Dev",
            "experience": 0,
            "deadline": "48h",
            "consent": false,
        }));
        let missing = resolver().resolve(&ServiceType::Cv, &data);
        // Whitespace-only is missing; "0", 0 and an explicit false are not.
        assert_eq!(missing.keys, ["full_name"]);
    }

    #[test]
    fn test_complete_submission_has_no_missing_fields() {
        let data = fields(json!({
            "full_name": "Ama K.",
            "phone": "+22890000000",
            "email": "ama@example.com",
            "role": "Data analyst",
            "experience": "3 ans",
            "deadline": "72h",
            "consent": true,
        }));
        assert!(resolver().resolve(&ServiceType::Cv, &data).is_empty());
    }

    #[test]
    fn test_unknown_service_requires_nothing() {
        let missing = resolver().resolve(
            &ServiceType::Other("xz".to_string()),
            &LeadFields::new(),
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn test_threshold_policy() {
        assert!(needs_clarification(0));
        assert!(needs_clarification(59));
        assert!(!needs_clarification(60));
        assert!(!needs_clarification(100));
    }
}
