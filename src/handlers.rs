use crate::advisor::Advisor;
use crate::api_models::{
    ChatFailure, ChatRequest, ChatResponse, GroupedProviders, ProviderLookupRequest,
    ProviderLookupResponse,
};
use crate::config::Config;
use crate::errors::AppError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Conversation pipeline, including the provider source it reads from.
    pub advisor: Advisor,
}

/// Health check endpoint.
///
/// Returns the service status, version, and which collaborators are active.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "source": state.advisor.source().name(),
            "delegate": state.advisor.is_delegated(),
            "model": state
                .advisor
                .is_delegated()
                .then(|| state.config.completion.model.clone()),
        })),
    )
}

/// POST /api/v1/chat
///
/// Answers one chat message: extracts profile details, looks up the area's
/// providers, and returns the reply with provider and bundle recommendations.
/// The caller merges `userProfileUpdate` into its profile for the next turn.
#[utoipa::path(
    post,
    path = "/api/v1/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Turn answered", body = ChatResponse),
        (status = 400, description = "Unusable request", body = ChatFailure),
        (status = 500, description = "Turn failed", body = ChatFailure)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatFailure> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat request body: {}", rejection.body_text());
        ChatFailure::invalid_request(rejection.body_text())
    })?;

    tracing::info!(
        "POST /chat - {} prior turn(s), zip known: {}",
        request.conversation_history.len(),
        request.user_profile.zip_code.is_some()
    );
    if let Some(ref location) = request.user_location {
        tracing::debug!("Chat embedded on page for location: {}", location);
    }

    let outcome = state
        .advisor
        .handle_turn(
            &request.message,
            &request.conversation_history,
            &request.user_profile,
        )
        .await
        .map_err(|e| match e {
            AppError::BadRequest(msg) => ChatFailure::invalid_request(msg),
            other => {
                tracing::error!("Chat turn failed: {}", other);
                ChatFailure::internal()
            }
        })?;

    Ok(Json(ChatResponse {
        success: true,
        response: outcome.reply,
        provider_recommendations: outcome.provider_recommendations,
        bundle_options: outcome.bundle_recommendations,
        user_profile_update: outcome.profile_delta,
    }))
}

/// POST /api/v1/providers
///
/// Lists the providers serving a ZIP code, flat and grouped by service type.
#[utoipa::path(
    post,
    path = "/api/v1/providers",
    request_body = ProviderLookupRequest,
    responses(
        (status = 200, description = "Providers for the ZIP code", body = ProviderLookupResponse),
        (status = 400, description = "ZIP code missing or body malformed"),
        (status = 500, description = "Provider source failed")
    )
)]
pub async fn lookup_providers(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProviderLookupRequest>, JsonRejection>,
) -> Result<Json<ProviderLookupResponse>, AppError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::warn!("Rejected providers request body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    })?;

    let zip_code = request
        .zip_code
        .map(|z| z.trim().to_string())
        .filter(|z| !z.is_empty())
        .ok_or_else(|| AppError::BadRequest("ZIP code is required".to_string()))?;

    tracing::info!("POST /providers - searching ZIP code {}", zip_code);

    let providers = state.advisor.source().providers_for_zip(&zip_code).await?;
    tracing::info!("Found {} provider(s) for ZIP {}", providers.len(), zip_code);

    Ok(Json(ProviderLookupResponse {
        success: true,
        grouped_providers: GroupedProviders::from_providers(&providers),
        total: providers.len(),
        zip_code,
        providers,
    }))
}
