use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::clients::store::{self, ClientDetails};
use crate::documents;
use crate::errors::AppError;
use crate::models::analysis::{ClientAnalysis, Priority};
use crate::models::client::{ClientRow, CvDocument};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub priority: Option<Priority>,
}

/// Create/update payload. `interaction` appends a dated note alongside the
/// detail changes; `analyze_now` forces an immediate analysis regardless of
/// the auto-analyze flag.
#[derive(Debug, Deserialize)]
pub struct ClientPayload {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub interaction: Option<String>,
    #[serde(default)]
    pub analyze_now: bool,
}

#[derive(Debug, Deserialize)]
pub struct InteractionPayload {
    pub text: String,
}

impl ClientPayload {
    fn details(&self) -> Result<ClientDetails, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        Ok(ClientDetails {
            name: self.name.trim().to_string(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            notes: self.notes.clone(),
        })
    }

    fn interaction_text(&self) -> Option<&str> {
        self.interaction
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Client {id} not found"))
}

/// Runs the engine on the record and persists the result. Infallible with
/// respect to analysis itself — only the persistence write can error.
async fn analyze_and_save(
    state: &AppState,
    client: &mut ClientRow,
) -> Result<ClientAnalysis, AppError> {
    let analysis = state.engine.analyze(client).await;
    store::save_analysis(&state.db, client.id, &analysis).await?;
    client.analysis = Some(SqlJson(analysis.clone()));
    Ok(analysis)
}

/// GET /api/v1/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<ClientRow>>, AppError> {
    let clients = store::search(&state.db, params.q.as_deref(), params.priority).await?;
    Ok(Json(clients))
}

/// GET /api/v1/clients/:id
pub async fn handle_get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientRow>, AppError> {
    let client = store::get(&state.db, id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(client))
}

/// POST /api/v1/clients
pub async fn handle_create_client(
    State(state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<(StatusCode, Json<ClientRow>), AppError> {
    let details = payload.details()?;
    let mut client = store::create(&state.db, &details, payload.interaction_text()).await?;

    if payload.analyze_now || state.config.auto_analyze_on_save {
        analyze_and_save(&state, &mut client).await?;
    }

    Ok((StatusCode::CREATED, Json(client)))
}

/// PUT /api/v1/clients/:id
pub async fn handle_update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<ClientRow>, AppError> {
    let details = payload.details()?;
    let mut client = store::update_details(&state.db, id, &details)
        .await?
        .ok_or_else(|| not_found(id))?;

    if let Some(text) = payload.interaction_text() {
        store::add_interaction(&state.db, id, text).await?;
        client = store::get(&state.db, id).await?.ok_or_else(|| not_found(id))?;
    }

    if payload.analyze_now || state.config.auto_analyze_on_save {
        analyze_and_save(&state, &mut client).await?;
    }

    Ok(Json(client))
}

/// DELETE /api/v1/clients/:id
pub async fn handle_delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let client = store::get(&state.db, id).await?.ok_or_else(|| not_found(id))?;

    if let Some(cv) = client.cv.as_ref() {
        documents::delete_cv_best_effort(&state.s3, &state.config.s3_bucket, &cv.file_key).await;
    }

    store::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/:id/interactions
pub async fn handle_add_interaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InteractionPayload>,
) -> Result<StatusCode, AppError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "interaction text must not be empty".to_string(),
        ));
    }

    if !store::add_interaction(&state.db, id, text).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/clients/:id/analyze
///
/// Fetch → analyze → persist → return. The response always carries a valid
/// analysis; a degraded run is visible only through `source: "heuristic"`.
pub async fn handle_analyze_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientAnalysis>, AppError> {
    let mut client = store::get(&state.db, id).await?.ok_or_else(|| not_found(id))?;
    let analysis = analyze_and_save(&state, &mut client).await?;
    Ok(Json(analysis))
}

/// POST /api/v1/clients/:id/cv  (multipart, field name `file`)
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<CvDocument>, AppError> {
    let mut client = store::get(&state.db, id).await?.ok_or_else(|| not_found(id))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("cv.bin").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("failed to read upload: {e}")))?;
        if !data.is_empty() {
            upload = Some((file_name, content_type, data));
            break;
        }
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("missing or empty 'file' field".to_string()))?;

    let cv = documents::store_cv(
        &state.s3,
        &state.config.s3_bucket,
        client.id,
        file_name,
        content_type,
        data,
    )
    .await?;

    // Replace any previous upload; the old object is unreferenced after this.
    if let Some(previous) = client.cv.as_ref() {
        documents::delete_cv_best_effort(&state.s3, &state.config.s3_bucket, &previous.file_key)
            .await;
    }

    store::save_cv(&state.db, client.id, &cv).await?;
    client.cv = Some(SqlJson(cv.clone()));

    if state.config.auto_analyze_on_save {
        analyze_and_save(&state, &mut client).await?;
    }

    Ok(Json(cv))
}
