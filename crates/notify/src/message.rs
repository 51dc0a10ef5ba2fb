//! Lead notification formatting

use lead_desk_core::LeadSubmission;

/// Subject line of the operator notification.
pub fn lead_subject(lead: &LeadSubmission) -> String {
    let name = lead.fields.text("full_name").unwrap_or("Sans nom");
    format!(
        "Nouveau brief {}: {}",
        lead.service_type.display_name(),
        name
    )
}

/// Plain-text body of the operator notification. `price` is the service
/// price already rendered by the shared formatter, when the service has one.
pub fn lead_body(lead: &LeadSubmission, price: Option<&str>) -> String {
    let field = |key: &str| lead.fields.text(key).unwrap_or("-").to_string();

    format!(
        "Reference: {id}\n\
         Service: {service}\n\
         Tarif: {price}\n\
         Nom: {name}\n\
         Email: {email}\n\
         WhatsApp: {phone}\n\
         Objectif: {objective}\n\
         Poste vise: {role}\n\
         Delai: {deadline}\n\
         Langue: {language}\n\
         Pays/Ville: {country} / {city}\n\
         Site/LinkedIn: {website}\n\
         Projets: {projects}\n\
         Besoin:\n{need}\n",
        id = lead.id,
        service = lead.service_type.display_name(),
        price = price.unwrap_or("-"),
        name = field("full_name"),
        email = field("email"),
        phone = field("phone"),
        objective = field("objective"),
        role = field("role"),
        deadline = field("deadline"),
        language = field("language"),
        country = field("country"),
        city = field("city"),
        website = field("website"),
        projects = field("projects"),
        need = field("need"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_desk_core::{FieldValue, LeadFields, ServiceType};

    fn lead() -> LeadSubmission {
        let mut fields = LeadFields::new();
        fields.insert("full_name", FieldValue::Text("Ama K.".to_string()));
        fields.insert("email", FieldValue::Text("ama@example.com".to_string()));
        fields.insert("phone", FieldValue::Text("+22890000000".to_string()));
        fields.insert("need", FieldValue::Text("Un CV moderne".to_string()));
        LeadSubmission::new(ServiceType::Cv, fields)
    }

    #[test]
    fn test_subject_names_service_and_lead() {
        let subject = lead_subject(&lead());
        assert_eq!(subject, "Nouveau brief CV: Ama K.");
    }

    #[test]
    fn test_subject_without_name() {
        let lead = LeadSubmission::new(ServiceType::Portfolio, LeadFields::new());
        assert_eq!(lead_subject(&lead), "Nouveau brief portfolio: Sans nom");
    }

    #[test]
    fn test_body_contains_contact_and_need() {
        let body = lead_body(&lead(), Some("9 900 CFA (~$16.50)"));
        assert!(body.contains("Nom: Ama K."));
        assert!(body.contains("WhatsApp: +22890000000"));
        assert!(body.contains("Tarif: 9 900 CFA (~$16.50)"));
        assert!(body.contains("Un CV moderne"));
        assert!(body.contains("Objectif: -"));
    }

    #[test]
    fn test_body_without_a_known_price() {
        let body = lead_body(&lead(), None);
        assert!(body.contains("Tarif: -"));
    }
}
