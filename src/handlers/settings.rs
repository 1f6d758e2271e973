use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{FaqEntry, Settings};
use crate::state::AppState;

// GET /settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Settings>, AppError> {
    let db = state.db.lock().unwrap();
    let settings = queries::get_settings(&db)?.unwrap_or_default();
    Ok(Json(settings))
}

// PUT /settings
//
// Shallow overwrite: only fields present in the request replace stored
// values; the faqs list, when present, is replaced wholesale.
#[derive(Deserialize)]
pub struct UpdateSettingsRequest {
    pub terms_and_conditions: Option<String>,
    pub privacy_policy: Option<String>,
    pub faqs: Option<Vec<FaqEntry>>,
    pub contact_info: Option<String>,
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, AppError> {
    let db = state.db.lock().unwrap();

    let mut settings = queries::get_settings(&db)?.unwrap_or_default();

    if let Some(terms) = body.terms_and_conditions {
        settings.terms_and_conditions = terms;
    }
    if let Some(policy) = body.privacy_policy {
        settings.privacy_policy = policy;
    }
    if let Some(faqs) = body.faqs {
        settings.faqs = faqs;
    }
    if let Some(contact) = body.contact_info {
        settings.contact_info = contact;
    }

    queries::save_settings(&db, &settings)?;
    Ok(Json(settings))
}
