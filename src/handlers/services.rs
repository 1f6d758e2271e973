use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, Service};
use crate::state::AppState;

// POST /services
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub worker_id: String,
    pub name: String,
    pub category: String,
    pub price: i64,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("service name is required".to_string()));
    }
    if body.price < 0 {
        return Err(AppError::Validation("price cannot be negative".to_string()));
    }

    let db = state.db.lock().unwrap();

    let worker = queries::get_user(&db, &body.worker_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {}", body.worker_id)))?;
    if worker.role != Role::Worker {
        return Err(AppError::Forbidden(
            "only workers can list services".to_string(),
        ));
    }

    let service = Service {
        id: uuid::Uuid::new_v4().to_string(),
        worker_id: worker.id,
        name: name.to_string(),
        category: body.category.trim().to_string(),
        price: body.price,
        created_at: Utc::now().naive_utc(),
    };
    queries::create_service(&db, &service)?;

    Ok(Json(service))
}

// GET /services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db.lock().unwrap();
    Ok(Json(queries::list_services(&db)?))
}

// GET /services/worker/:worker_id
pub async fn list_services_for_worker(
    State(state): State<Arc<AppState>>,
    Path(worker_id): Path<String>,
) -> Result<Json<Vec<Service>>, AppError> {
    let db = state.db.lock().unwrap();
    Ok(Json(queries::list_services_for_worker(&db, &worker_id)?))
}
