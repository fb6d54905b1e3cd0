//! Dashboard aggregation: counts by priority, company, and creation month.

use std::collections::HashMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::clients::store;
use crate::errors::AppError;
use crate::models::analysis::Priority;
use crate::models::client::ClientRow;
use crate::state::AppState;

const TOP_COMPANIES: usize = 8;
const MONTH_WINDOW: usize = 12;

#[derive(Debug, Serialize)]
pub struct CompanyCount {
    pub company: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct MonthCount {
    /// `YYYY-MM` of the clients' creation date.
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_clients: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Clients with no analysis yet, or an analysis left at `Unknown`.
    pub unanalyzed: usize,
    pub clients_by_company: Vec<CompanyCount>,
    pub clients_by_month: Vec<MonthCount>,
}

/// GET /api/v1/dashboard/summary
pub async fn handle_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let clients = store::search(&state.db, None, None).await?;
    Ok(Json(summarize(&clients)))
}

/// Aggregates the full client list. Pure; ordering is deterministic
/// (count-descending with alphabetical tie-break for companies, chronological
/// for months).
pub fn summarize(clients: &[ClientRow]) -> DashboardSummary {
    let priority_of = |client: &ClientRow| client.analysis.as_ref().map(|a| a.priority);

    let high = clients
        .iter()
        .filter(|c| priority_of(c) == Some(Priority::High))
        .count();
    let medium = clients
        .iter()
        .filter(|c| priority_of(c) == Some(Priority::Medium))
        .count();
    let low = clients
        .iter()
        .filter(|c| priority_of(c) == Some(Priority::Low))
        .count();
    let unanalyzed = clients
        .iter()
        .filter(|c| matches!(priority_of(c), None | Some(Priority::Unknown)))
        .count();

    let mut company_counts: HashMap<&str, usize> = HashMap::new();
    for client in clients {
        if let Some(company) = client.company.as_deref().map(str::trim) {
            if !company.is_empty() {
                *company_counts.entry(company).or_default() += 1;
            }
        }
    }
    let mut clients_by_company: Vec<CompanyCount> = company_counts
        .into_iter()
        .map(|(company, count)| CompanyCount {
            company: company.to_string(),
            count,
        })
        .collect();
    clients_by_company.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.company.cmp(&b.company)));
    clients_by_company.truncate(TOP_COMPANIES);

    let mut month_counts: HashMap<String, usize> = HashMap::new();
    for client in clients {
        let month = client.created_at.format("%Y-%m").to_string();
        *month_counts.entry(month).or_default() += 1;
    }
    let mut clients_by_month: Vec<MonthCount> = month_counts
        .into_iter()
        .map(|(month, count)| MonthCount { month, count })
        .collect();
    clients_by_month.sort_by(|a, b| a.month.cmp(&b.month));
    let cutoff = clients_by_month.len().saturating_sub(MONTH_WINDOW);
    clients_by_month.drain(..cutoff);

    DashboardSummary {
        total_clients: clients.len(),
        high,
        medium,
        low,
        unanalyzed,
        clients_by_company,
        clients_by_month,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::{AnalysisSource, ClientAnalysis};
    use chrono::{TimeZone, Utc};
    use sqlx::types::Json;
    use uuid::Uuid;

    fn make_client(
        company: Option<&str>,
        priority: Option<Priority>,
        created: (i32, u32),
    ) -> ClientRow {
        ClientRow {
            id: Uuid::new_v4(),
            name: "Client".to_string(),
            email: None,
            phone: None,
            company: company.map(String::from),
            notes: None,
            interactions: Json(Vec::new()),
            cv: None,
            analysis: priority.map(|p| {
                Json(ClientAnalysis {
                    priority: p,
                    summary: String::new(),
                    keywords: Vec::new(),
                    generated_at: Utc::now(),
                    source: AnalysisSource::Heuristic,
                })
            }),
            created_at: Utc
                .with_ymd_and_hms(created.0, created.1, 15, 10, 0, 0)
                .unwrap(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_priority_counts() {
        let clients = vec![
            make_client(None, Some(Priority::High), (2026, 1)),
            make_client(None, Some(Priority::High), (2026, 1)),
            make_client(None, Some(Priority::Medium), (2026, 1)),
            make_client(None, Some(Priority::Low), (2026, 1)),
            make_client(None, Some(Priority::Unknown), (2026, 1)),
            make_client(None, None, (2026, 1)),
        ];

        let summary = summarize(&clients);
        assert_eq!(summary.total_clients, 6);
        assert_eq!(summary.high, 2);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.low, 1);
        // Unknown and not-yet-analyzed both count as unanalyzed.
        assert_eq!(summary.unanalyzed, 2);
    }

    #[test]
    fn test_companies_ranked_and_capped_at_eight() {
        let mut clients = Vec::new();
        for i in 0..10 {
            for _ in 0..=i {
                clients.push(make_client(Some(&format!("Company {i}")), None, (2026, 1)));
            }
        }

        let summary = summarize(&clients);
        assert_eq!(summary.clients_by_company.len(), 8);
        assert_eq!(summary.clients_by_company[0].company, "Company 9");
        assert_eq!(summary.clients_by_company[0].count, 10);
        // The two smallest groups fall off.
        assert!(summary
            .clients_by_company
            .iter()
            .all(|c| c.company != "Company 0" && c.company != "Company 1"));
    }

    #[test]
    fn test_blank_companies_excluded_and_names_trimmed() {
        let clients = vec![
            make_client(Some("  Acme  "), None, (2026, 1)),
            make_client(Some("Acme"), None, (2026, 1)),
            make_client(Some("   "), None, (2026, 1)),
            make_client(None, None, (2026, 1)),
        ];

        let summary = summarize(&clients);
        assert_eq!(summary.clients_by_company.len(), 1);
        assert_eq!(summary.clients_by_company[0].company, "Acme");
        assert_eq!(summary.clients_by_company[0].count, 2);
    }

    #[test]
    fn test_months_ascending_and_formatted() {
        let clients = vec![
            make_client(None, None, (2026, 3)),
            make_client(None, None, (2026, 1)),
            make_client(None, None, (2026, 1)),
            make_client(None, None, (2025, 11)),
        ];

        let summary = summarize(&clients);
        let months: Vec<&str> = summary
            .clients_by_month
            .iter()
            .map(|m| m.month.as_str())
            .collect();
        assert_eq!(months, vec!["2025-11", "2026-01", "2026-03"]);
        assert_eq!(summary.clients_by_month[1].count, 2);
    }

    #[test]
    fn test_months_keep_only_last_twelve() {
        let clients: Vec<ClientRow> = (1..=14)
            .map(|m| {
                let year = 2025 + (m - 1) / 12;
                let month = ((m - 1) % 12) + 1;
                make_client(None, None, (year as i32, month as u32))
            })
            .collect();

        let summary = summarize(&clients);
        assert_eq!(summary.clients_by_month.len(), 12);
        assert_eq!(summary.clients_by_month[0].month, "2025-03");
        assert_eq!(summary.clients_by_month[11].month, "2026-02");
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_clients, 0);
        assert_eq!(summary.unanalyzed, 0);
        assert!(summary.clients_by_company.is_empty());
        assert!(summary.clients_by_month.is_empty());
    }
}
