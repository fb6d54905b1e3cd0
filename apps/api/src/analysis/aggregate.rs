//! Text aggregation — the two text views of a client record that feed
//! analysis: a labeled blob for the model prompt and a flat blob for
//! heuristic scoring.

use std::fmt::Write;

use crate::models::client::{ClientRow, InteractionNote};

/// Interactions included in the model prompt, most recent first.
const PROMPT_INTERACTION_LIMIT: usize = 20;

/// Builds the labeled text block embedded in the model prompt: notes, then
/// the most recent interactions (descending by timestamp, rendered as
/// `[timestamp] text`), then the extracted CV text. Empty sections are
/// omitted entirely.
pub fn prompt_blob(client: &ClientRow) -> String {
    let mut out = String::new();

    if let Some(notes) = client.notes.as_deref() {
        if !notes.trim().is_empty() {
            out.push_str(notes);
            out.push('\n');
        }
    }

    if !client.interactions.is_empty() {
        out.push_str("--- Interactions ---\n");
        let mut recent: Vec<&InteractionNote> = client.interactions.iter().collect();
        recent.sort_by(|a, b| b.at.cmp(&a.at));
        for note in recent.into_iter().take(PROMPT_INTERACTION_LIMIT) {
            let _ = writeln!(
                out,
                "[{}] {}",
                note.at.format("%Y-%m-%d %H:%M:%SZ"),
                note.text
            );
        }
    }

    if let Some(cv_text) = client.cv_text() {
        if !cv_text.trim().is_empty() {
            out.push_str("--- CV Extract ---\n");
            out.push_str(cv_text);
            out.push('\n');
        }
    }

    out
}

/// Builds the flat blob the heuristic scores: notes, every interaction text
/// in stored order, and the extracted CV text, newline-joined. Order is
/// irrelevant to scoring; the unlowercased result also feeds the summary.
pub fn scoring_blob(client: &ClientRow) -> String {
    let notes = client.notes.as_deref().unwrap_or("");
    let interactions = client
        .interactions
        .iter()
        .map(|note| note.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let cv_text = client.cv_text().unwrap_or("");

    format!("{notes}\n{interactions}\n{cv_text}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::client::CvDocument;
    use chrono::{Duration, TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn make_client(
        notes: Option<&str>,
        interactions: Vec<InteractionNote>,
        cv_text: Option<&str>,
    ) -> ClientRow {
        ClientRow {
            id: Uuid::new_v4(),
            name: "Ada Martin".to_string(),
            email: None,
            phone: None,
            company: None,
            notes: notes.map(String::from),
            interactions: Json(interactions),
            cv: cv_text.map(|text| {
                Json(CvDocument {
                    file_key: "cv/test".to_string(),
                    file_name: "cv.pdf".to_string(),
                    content_type: "application/pdf".to_string(),
                    size: 1,
                    extracted_text: Some(text.to_string()),
                })
            }),
            analysis: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prompt_blob_labels_sections() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let client = make_client(
            Some("main notes"),
            vec![InteractionNote {
                at: base,
                text: "called back".to_string(),
            }],
            Some("cv body"),
        );

        let blob = prompt_blob(&client);
        assert!(blob.starts_with("main notes\n"));
        assert!(blob.contains("--- Interactions ---"));
        assert!(blob.contains("[2026-03-01 09:00:00Z] called back"));
        assert!(blob.contains("--- CV Extract ---\ncv body"));
    }

    #[test]
    fn test_prompt_blob_keeps_twenty_most_recent_descending() {
        let base = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let interactions: Vec<InteractionNote> = (0..25)
            .map(|i| InteractionNote {
                at: base + Duration::days(i),
                text: format!("interaction {i}"),
            })
            .collect();
        let client = make_client(None, interactions, None);

        let blob = prompt_blob(&client);
        // Newest first...
        let newest = blob.find("interaction 24").unwrap();
        let older = blob.find("interaction 10").unwrap();
        assert!(newest < older);
        // ...and the 5 oldest are cut.
        assert!(blob.contains("interaction 5"));
        assert!(!blob.contains("interaction 4\n"));
        assert!(!blob.contains("interaction 0\n"));
    }

    #[test]
    fn test_prompt_blob_omits_empty_sections() {
        let client = make_client(Some("   "), Vec::new(), None);
        let blob = prompt_blob(&client);
        assert!(blob.is_empty());
        assert!(!blob.contains("--- Interactions ---"));
        assert!(!blob.contains("--- CV Extract ---"));
    }

    #[test]
    fn test_scoring_blob_includes_all_parts() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let client = make_client(
            Some("notes"),
            vec![
                InteractionNote {
                    at: base,
                    text: "first".to_string(),
                },
                InteractionNote {
                    at: base - Duration::days(1),
                    text: "second".to_string(),
                },
            ],
            Some("cv text"),
        );

        let blob = scoring_blob(&client);
        assert_eq!(blob, "notes\nfirst\nsecond\ncv text");
    }

    #[test]
    fn test_scoring_blob_of_empty_record_is_whitespace_only() {
        let client = make_client(None, Vec::new(), None);
        assert_eq!(scoring_blob(&client), "\n\n");
    }
}
