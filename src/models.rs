use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

// ============ Profile Models ============

/// Stated monthly budget, per service category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Budget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electricity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

impl Budget {
    /// Shallow merge: fields set on `update` override, the rest persist.
    pub fn merged_with(&self, update: &Budget) -> Budget {
        Budget {
            internet: update.internet.or(self.internet),
            cellular: update.cellular.or(self.cellular),
            electricity: update.electricity.or(self.electricity),
            total: update.total.or(self.total),
        }
    }
}

/// How heavily the household uses its internet connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InternetUsage {
    Light,
    Moderate,
    Heavy,
}

/// What the user cares about most when choosing a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Price,
    Reliability,
    Speed,
}

/// Session-scoped profile of the person chatting with the advisor.
///
/// Every field is optional: the profile starts empty and fills up as the
/// conversation reveals details. The caller owns it and threads it through
/// each turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub household_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<Budget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_from_home: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internet_usage: Option<InternetUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priorities: Option<Vec<Priority>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_providers: Option<Vec<String>>,
}

/// The profile fields detected in a single message.
///
/// Same shape as `UserProfile`; a `None` field means "not mentioned this
/// turn", never "clear this field".
pub type ProfileDelta = UserProfile;

impl UserProfile {
    pub fn has_priority(&self, priority: Priority) -> bool {
        self.priorities
            .as_ref()
            .is_some_and(|list| list.contains(&priority))
    }

    pub fn is_empty(&self) -> bool {
        *self == UserProfile::default()
    }
}

// ============ Directory Models ============

/// Category of utility service a provider offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Electricity,
    Internet,
    Cellular,
    Waste,
    Water,
    Gas,
}

impl ServiceType {
    pub const ALL: [ServiceType; 6] = [
        ServiceType::Electricity,
        ServiceType::Internet,
        ServiceType::Cellular,
        ServiceType::Waste,
        ServiceType::Water,
        ServiceType::Gas,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Electricity => "electricity",
            ServiceType::Internet => "internet",
            ServiceType::Cellular => "cellular",
            ServiceType::Waste => "waste",
            ServiceType::Water => "water",
            ServiceType::Gas => "gas",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "electricity" => Ok(ServiceType::Electricity),
            "internet" => Ok(ServiceType::Internet),
            "cellular" => Ok(ServiceType::Cellular),
            // Older listings call waste collection "trash"
            "waste" | "trash" => Ok(ServiceType::Waste),
            "water" => Ok(ServiceType::Water),
            "gas" => Ok(ServiceType::Gas),
            other => Err(format!("unknown service type '{}'", other)),
        }
    }
}

/// A utility provider serving one or more ZIP codes.
///
/// Read-only: providers are fetched per query and only ever filtered,
/// sorted or sliced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Provider {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Service category.
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: String,
    /// ZIP codes this provider serves.
    #[serde(default)]
    pub service_areas: Vec<String>,
    /// Customer rating, 0-5.
    #[serde(default)]
    pub rating: f64,
    /// Composite score, 0-100.
    #[serde(default)]
    pub overall_score: f64,
    #[serde(default)]
    pub popularity_score: f64,
    #[serde(default)]
    pub coverage_score: f64,
    /// Affordability score, 0-100 (higher is cheaper).
    #[serde(default)]
    pub price_score: f64,
    /// Carrier network used by a cellular provider (e.g. an MVNO's host).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cellular_network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub cellular_plans: Option<serde_json::Value>,
    /// Whether the cellular plan is only sold alongside an internet plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_internet_subscription: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub bundle_options: Option<serde_json::Value>,
    /// Advertised monthly price range, e.g. "$45-85/month".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    /// Typical time to get connected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_time: Option<String>,
    /// Human-readable coverage description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
}

/// A multi-service package offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Bundle {
    pub id: String,
    pub bundle_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,
    /// Service type names included in the bundle, e.g. ["internet", "cellular"].
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub monthly_price: f64,
    #[serde(default)]
    pub monthly_savings: f64,
    #[serde(default)]
    pub annual_savings: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub requirements: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub features: Option<serde_json::Value>,
}

impl Bundle {
    pub fn includes(&self, service: ServiceType) -> bool {
        self.services
            .iter()
            .any(|s| s.eq_ignore_ascii_case(service.as_str()))
    }
}

// ============ Conversation Models ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One prior message of the conversation, as sent back by the chat UI.
///
/// The UI attaches extra fields (ids, rendered recommendations); only the
/// role, content and timestamp are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatTurn {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_uses_camel_case_and_skips_unset_fields() {
        let profile = UserProfile {
            zip_code: Some("43215".to_string()),
            work_from_home: Some(true),
            ..Default::default()
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value, json!({"zipCode": "43215", "workFromHome": true}));
    }

    #[test]
    fn test_provider_deserializes_with_missing_scores() {
        let provider: Provider = serde_json::from_value(json!({
            "id": "p1",
            "name": "Spectrum",
            "type": "internet",
            "service_areas": ["43215"]
        }))
        .unwrap();

        assert_eq!(provider.service_type, ServiceType::Internet);
        assert_eq!(provider.overall_score, 0.0);
        assert!(provider.cellular_network.is_none());
    }

    #[test]
    fn test_service_type_accepts_trash_alias() {
        assert_eq!("trash".parse::<ServiceType>(), Ok(ServiceType::Waste));
        assert_eq!(" Internet ".parse::<ServiceType>(), Ok(ServiceType::Internet));
        assert!("satellite".parse::<ServiceType>().is_err());
    }

    #[test]
    fn test_budget_merge_preserves_other_fields() {
        let base = Budget {
            total: Some(250.0),
            ..Default::default()
        };
        let update = Budget {
            internet: Some(60.0),
            ..Default::default()
        };

        let merged = base.merged_with(&update);
        assert_eq!(merged.internet, Some(60.0));
        assert_eq!(merged.total, Some(250.0));
    }

    #[test]
    fn test_chat_turn_ignores_ui_fields() {
        let turn: ChatTurn = serde_json::from_value(json!({
            "id": "17",
            "role": "assistant",
            "content": "Hi!",
            "timestamp": "2026-01-05T10:00:00Z",
            "providerRecommendations": []
        }))
        .unwrap();

        assert_eq!(turn.role, ChatRole::Assistant);
        assert!(turn.timestamp.is_some());
    }
}
