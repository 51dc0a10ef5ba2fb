//! Prompt builders
//!
//! Two prompts leave this module: the sales-assistant system prompt used by
//! the chat endpoint, and the structured-brief prompt used by the lead
//! summarization call. Prices inside prompts go through the shared
//! formatter so the model is shown exactly the format the guard enforces.

use serde_json::{json, Value};

use lead_desk_config::{format_price, Catalog};
use lead_desk_core::{LeadSubmission, ServiceType};

/// System prompt for the conversational sales assistant.
pub fn sales_system_prompt(catalog: &Catalog) -> String {
    let prices = &catalog.prices;
    format!(
        "You are a strong sales assistant for a web-services studio \
         (portfolio, site vitrine, CV, lettre de motivation, pack CV + lettre). \
         Answer in French, concise, confident, and helpful. \
         Always show prices exactly in this format: '{portfolio}'. \
         Never omit the $ symbol. \
         Pricing: Portfolio {portfolio}. Site vitrine {vitrine}. \
         CV {cv}. Lettre de motivation {lettre}. Pack CV + lettre {pack}. \
         Hebergement {hosting_month}/mois. Hebergement annuel {hosting_year}/an. \
         Offre annuelle {hosting_discount}/an. \
         Ask one short clarifying question and guide to conversion.",
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

/// Pick the output language for the brief from the lead's language fields.
pub fn output_language(language: &str, language_other: &str) -> String {
    let language = language.to_lowercase();
    let language_other = language_other.trim();
    if language.contains("anglais") && !language.contains("fran") {
        "English".to_string()
    } else if language.contains("bilingue") {
        "French and English".to_string()
    } else if language.contains("autre") && !language_other.is_empty() {
        language_other.to_string()
    } else {
        "French".to_string()
    }
}

/// Structured payload sent to the summarization model.
pub fn build_brief_payload(lead: &LeadSubmission) -> Value {
    let fields = &lead.fields;
    json!({
        "service_type": lead.service_type.canonical_name(),
        "identity": {
            "full_name": fields.text("full_name"),
            "phone_whatsapp": fields.text("phone"),
            "email": fields.text("email"),
        },
        "objective": fields.text("objective"),
        "deadline": fields.text("deadline"),
        "service_info": {
            "target_role": fields.text("role"),
            "language": fields.text("language"),
            "language_other": fields.text("language_other"),
            "country": fields.text("country"),
            "city": fields.text("city"),
            "audience": fields.text("audience"),
            "style": fields.text("style"),
            "budget_band": fields.text("budget"),
        },
        "content": {
            "need": fields.text("need"),
            "strengths": fields.text("strengths"),
            "projects": fields.text("projects"),
            "website": fields.text("website"),
            "competitor_examples": fields.text("competitor_examples"),
            "content_assets": fields.text("content_assets"),
            "clarifications": &lead.clarifications,
        },
        "consent": fields.is_truthy("consent"),
        "metadata": {
            "created_at": lead.created_at.to_rfc3339(),
            "source": &lead.source,
        },
    })
}

/// System + user prompt pair for the structured brief call.
pub fn brief_prompt(lead: &LeadSubmission) -> (String, String) {
    let system = "Return valid JSON only. No markdown, no commentary, no extra keys.".to_string();

    let language = output_language(
        lead.fields.text("language").unwrap_or_default(),
        lead.fields.text("language_other").unwrap_or_default(),
    );
    let payload = build_brief_payload(lead);

    let user = format!(
        "You are a {service} brief assistant. Produce ONLY valid JSON with this schema:\n\
         {{\n\
         \x20 \"brief_summary\": [string],\n\
         \x20 \"clarifying_questions\": [string],\n\
         \x20 \"plan\": [{{\"section\": string, \"content\": string, \"priority\": \"high|medium|low\"}}],\n\
         \x20 \"assets_checklist\": [string],\n\
         \x20 \"deliverables\": [string],\n\
         \x20 \"estimate\": {{\"price_range\": string, \"eta_days\": number, \"risk_level\": \"low|medium|high\"}},\n\
         \x20 \"quality_score\": {{\"score\": number, \"reasons\": [string]}},\n\
         \x20 \"whatsapp_message\": string,\n\
         \x20 \"email_message\": string,\n\
         \x20 \"internal_tags\": [string]\n\
         }}\n\n\
         Rules for quality_score:\n\
         - Need at least 1 link (LinkedIn/GitHub/website)\n\
         - At least 2 projects or experiences\n\
         - Objective clear + deadline realistic\n\
         - Contact OK + consent true\n\
         Language for all fields: {language}.\n\
         Input JSON:\n\
         {payload}",
        service = service_label(&lead.service_type),
        language = language,
        payload = payload,
    );

    (system, user)
}

fn service_label(service: &ServiceType) -> &str {
    match service {
        ServiceType::Other(_) => "project",
        known => known.display_name(),
    }
}
