use crate::models::{Bundle, ChatTurn, ProfileDelta, Provider, ServiceType, UserProfile};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// User-facing reply when a turn cannot be answered.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble right now. Please try again or browse providers directly.";

// ============ Turn API ============

/// Body of `POST /api/v1/chat`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
    #[serde(default)]
    pub user_profile: UserProfile,
    /// Free-text location from the page the chat is embedded in.
    #[serde(default)]
    pub user_location: Option<String>,
}

/// Successful turn.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub provider_recommendations: Vec<Provider>,
    pub bundle_options: Vec<Bundle>,
    /// Fields detected in this message, to be merged into the caller's profile.
    #[schema(value_type = UserProfile)]
    pub user_profile_update: ProfileDelta,
}

/// Failed turn; `response` still carries a message to show the user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChatFailure {
    pub success: bool,
    pub error: String,
    pub response: String,
    #[serde(skip)]
    status: u16,
}

impl ChatFailure {
    fn with_status(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            response: APOLOGY.to_string(),
            status: status.as_u16(),
        }
    }

    /// The request could not be used (malformed body, empty message).
    pub fn invalid_request(error: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, error)
    }

    /// Anything else that stopped the turn.
    pub fn internal() -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process request")
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ChatFailure {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

// ============ Provider lookup API ============

/// Body of `POST /api/v1/providers`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLookupRequest {
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// Providers split by service type, each list in source order.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct GroupedProviders {
    pub electricity: Vec<Provider>,
    pub internet: Vec<Provider>,
    pub cellular: Vec<Provider>,
    pub waste: Vec<Provider>,
    pub water: Vec<Provider>,
    pub gas: Vec<Provider>,
}

impl GroupedProviders {
    pub fn from_providers(providers: &[Provider]) -> Self {
        let mut grouped = GroupedProviders::default();
        for provider in providers {
            let bucket = match provider.service_type {
                ServiceType::Electricity => &mut grouped.electricity,
                ServiceType::Internet => &mut grouped.internet,
                ServiceType::Cellular => &mut grouped.cellular,
                ServiceType::Waste => &mut grouped.waste,
                ServiceType::Water => &mut grouped.water,
                ServiceType::Gas => &mut grouped.gas,
            };
            bucket.push(provider.clone());
        }
        grouped
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderLookupResponse {
    pub success: bool,
    pub zip_code: String,
    pub providers: Vec<Provider>,
    pub grouped_providers: GroupedProviders,
    pub total: usize,
}
