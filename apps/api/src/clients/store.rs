//! Persistence for client records.
//!
//! The analysis engine never touches this module: callers fetch a record,
//! run the engine, then persist the produced analysis through `save_analysis`.

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::analysis::{ClientAnalysis, Priority};
use crate::models::client::{ClientRow, CvDocument, InteractionNote};

/// Fields accepted when creating or updating a client.
#[derive(Debug, Clone)]
pub struct ClientDetails {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
}

/// Searches clients by optional free text (name/company/notes, ILIKE) and
/// optional analyzed priority, newest-updated first. Both filters absent
/// returns everything.
pub async fn search(
    pool: &PgPool,
    query: Option<&str>,
    priority: Option<Priority>,
) -> Result<Vec<ClientRow>, sqlx::Error> {
    let pattern = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{q}%"));

    sqlx::query_as(
        r#"
        SELECT * FROM clients
        WHERE ($1::text IS NULL
               OR name ILIKE $1
               OR company ILIKE $1
               OR notes ILIKE $1)
          AND ($2::text IS NULL OR analysis->>'priority' = $2)
        ORDER BY updated_at DESC
        "#,
    )
    .bind(pattern)
    .bind(priority.map(|p| p.as_str()))
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &PgPool, id: Uuid) -> Result<Option<ClientRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM clients WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts a new client, optionally seeded with a first interaction note.
pub async fn create(
    pool: &PgPool,
    details: &ClientDetails,
    first_interaction: Option<&str>,
) -> Result<ClientRow, sqlx::Error> {
    let interactions: Vec<InteractionNote> = first_interaction
        .map(|text| {
            vec![InteractionNote {
                at: Utc::now(),
                text: text.trim().to_string(),
            }]
        })
        .unwrap_or_default();

    sqlx::query_as(
        r#"
        INSERT INTO clients (name, email, phone, company, notes, interactions)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&details.name)
    .bind(&details.email)
    .bind(&details.phone)
    .bind(&details.company)
    .bind(&details.notes)
    .bind(Json(&interactions))
    .fetch_one(pool)
    .await
}

/// Updates the editable detail fields, bumping `updated_at`.
pub async fn update_details(
    pool: &PgPool,
    id: Uuid,
    details: &ClientDetails,
) -> Result<Option<ClientRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE clients
        SET name = $2, email = $3, phone = $4, company = $5, notes = $6, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&details.name)
    .bind(&details.email)
    .bind(&details.phone)
    .bind(&details.company)
    .bind(&details.notes)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Appends an interaction note to the client's history.
pub async fn add_interaction(pool: &PgPool, id: Uuid, text: &str) -> Result<bool, sqlx::Error> {
    let note = InteractionNote {
        at: Utc::now(),
        text: text.trim().to_string(),
    };

    let result = sqlx::query(
        r#"
        UPDATE clients
        SET interactions = interactions || $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(Json(&note))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn save_analysis(
    pool: &PgPool,
    id: Uuid,
    analysis: &ClientAnalysis,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE clients SET analysis = $2, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(Json(analysis))
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn save_cv(pool: &PgPool, id: Uuid, cv: &CvDocument) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE clients SET cv = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(Json(cv))
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
