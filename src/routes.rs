use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::{
    error::AppError,
    profile::{ProfilePatch, ProfileRecord},
    state::AppState,
};

/// Response envelope shared by every endpoint, success or failure.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            errors: None,
        }
    }

    pub fn with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
            errors: None,
        }
    }

    pub fn message(message: &str) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.to_string()),
            errors: None,
        }
    }

    pub fn failure(message: String, errors: Option<Vec<String>>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            errors,
        }
    }
}

pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileRecord>>, AppError> {
    let record = state
        .store
        .fetch(&user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ApiResponse::data(record)))
}

pub async fn get_profile_by_email_handler(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<ProfileRecord>>, AppError> {
    let email = email.trim().to_lowercase();

    let record = state
        .store
        .fetch_by_email(&email)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ApiResponse::data(record)))
}

pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    payload: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<ApiResponse<ProfileRecord>>, AppError> {
    let Json(patch) = payload.map_err(|_| AppError::MalformedPayload)?;
    let now = Utc::now();

    match state.store.fetch(&user_id).await? {
        Some(existing) => {
            let previous_email = existing.email.clone();
            let record = existing.update(patch, now)?;
            state.store.save(&record, Some(&previous_email)).await?;

            info!("Updated profile for {user_id}");
            Ok(Json(ApiResponse::with_message(
                record,
                "Profile updated successfully",
            )))
        }
        None => {
            let record = ProfileRecord::create(&user_id, patch, now)?;
            state.store.save(&record, None).await?;

            info!("Created profile for {user_id}");
            Ok(Json(ApiResponse::with_message(
                record,
                "Profile created successfully",
            )))
        }
    }
}

pub async fn delete_profile_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<ProfileRecord>>, AppError> {
    let record = state
        .store
        .fetch(&user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.store.delete(&record).await?;

    info!("Deleted profile for {user_id}");
    Ok(Json(ApiResponse::message("Profile deleted successfully")))
}

#[derive(Serialize)]
pub struct Health {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

pub async fn health_handler() -> Json<Health> {
    Json(Health {
        success: true,
        message: "Profile service is running".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

pub async fn not_found_handler() -> (StatusCode, Json<ApiResponse<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure(
            "API endpoint not found".to_string(),
            None,
        )),
    )
}
