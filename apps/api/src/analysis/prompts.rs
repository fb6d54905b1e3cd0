//! Prompt construction for model-backed client analysis.

use crate::analysis::aggregate;
use crate::models::client::ClientRow;

pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"You are a CRM assistant.
From the client data and notes/CV below, produce ONLY a valid JSON object with exactly these fields:
{ "priority": "High|Medium|Low", "summary": "string", "keywords": ["string"] }
Rules:
- priority = High for a very promising or urgent client; Medium otherwise; Low for weak potential.
- summary: a short synthesis of the client's situation.
- keywords: 5 to 12 short keywords, no duplicates.

CLIENT DATA:
Name: {name}
Company: {company}
Email: {email}
Phone: {phone}

NOTES/CV:
{notes}"#;

/// Fills the analysis template with the client's identifying fields and the
/// labeled aggregated text. Absent optional fields render as empty strings.
pub fn build_analyze_prompt(client: &ClientRow) -> String {
    ANALYZE_PROMPT_TEMPLATE
        .replace("{name}", &client.name)
        .replace("{company}", client.company.as_deref().unwrap_or(""))
        .replace("{email}", client.email.as_deref().unwrap_or(""))
        .replace("{phone}", client.phone.as_deref().unwrap_or(""))
        .replace("{notes}", &aggregate::prompt_blob(client))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    #[test]
    fn test_prompt_embeds_identity_and_notes() {
        let client = ClientRow {
            id: Uuid::new_v4(),
            name: "Nadia Benali".to_string(),
            email: Some("nadia@acme.test".to_string()),
            phone: None,
            company: Some("Acme".to_string()),
            notes: Some("prête à signer".to_string()),
            interactions: Json(Vec::new()),
            cv: None,
            analysis: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let prompt = build_analyze_prompt(&client);
        assert!(prompt.contains("Name: Nadia Benali"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("Email: nadia@acme.test"));
        assert!(prompt.contains("Phone: \n"));
        assert!(prompt.contains("prête à signer"));
        assert!(prompt.contains(r#""priority": "High|Medium|Low""#));
    }
}
