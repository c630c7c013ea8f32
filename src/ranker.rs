/// Recommendation ranking for providers and bundles
///
/// Both rankers work on the lists the source returned for the user's ZIP
/// code and never mutate them; they return owned, sorted slices.
use crate::models::{Bundle, Priority, Provider, ServiceType, UserProfile};
use std::cmp::Ordering;

/// How many providers a single turn recommends.
pub const MAX_PROVIDER_RECOMMENDATIONS: usize = 3;
/// How many bundles a single turn recommends.
pub const MAX_BUNDLE_RECOMMENDATIONS: usize = 2;

/// Keyword groups mapping a message to the service it asks about.
/// Checked in order; the first group with a hit decides.
const SERVICE_KEYWORDS: [(ServiceType, &[&str]); 4] = [
    (ServiceType::Internet, &["internet", "wifi"]),
    (ServiceType::Cellular, &["mobile", "cell"]),
    (ServiceType::Electricity, &["electric"]),
    (ServiceType::Waste, &["waste", "trash"]),
];

const BUNDLE_KEYWORDS: [&str; 3] = ["bundle", "package", "save"];

/// Service category the message asks about, if any.
pub fn requested_service(message: &str) -> Option<ServiceType> {
    let lower = message.to_lowercase();
    SERVICE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(service, _)| *service)
}

/// Descending order on a score; NaN-safe.
fn by_score_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Top providers of the requested service type.
///
/// Sort key follows the user's priorities in a fixed order: price first,
/// then reliability (rating), otherwise overall score. A speed priority has
/// no sort of its own and falls through to overall score.
pub fn rank_providers(message: &str, profile: &UserProfile, providers: &[Provider]) -> Vec<Provider> {
    let Some(service) = requested_service(message) else {
        return Vec::new();
    };

    let mut relevant: Vec<Provider> = providers
        .iter()
        .filter(|p| p.service_type == service)
        .cloned()
        .collect();

    if profile.has_priority(Priority::Price) {
        relevant.sort_by(|a, b| by_score_desc(a.price_score, b.price_score));
    } else if profile.has_priority(Priority::Reliability) {
        relevant.sort_by(|a, b| by_score_desc(a.rating, b.rating));
    } else {
        relevant.sort_by(|a, b| by_score_desc(a.overall_score, b.overall_score));
    }

    relevant.truncate(MAX_PROVIDER_RECOMMENDATIONS);
    tracing::debug!(
        "Ranked {} {} provider(s) for recommendation",
        relevant.len(),
        service
    );
    relevant
}

/// Whether the message is asking about bundle deals at all.
pub fn wants_bundles(message: &str) -> bool {
    let lower = message.to_lowercase();
    BUNDLE_KEYWORDS.iter().any(|k| lower.contains(k))
        || (lower.contains("internet") && lower.contains("mobile"))
}

/// Bundles with the largest monthly savings, when the message asks for them.
pub fn rank_bundles(message: &str, _profile: &UserProfile, bundles: &[Bundle]) -> Vec<Bundle> {
    if !wants_bundles(message) {
        return Vec::new();
    }

    let mut ranked = bundles.to_vec();
    ranked.sort_by(|a, b| by_score_desc(a.monthly_savings, b.monthly_savings));
    ranked.truncate(MAX_BUNDLE_RECOMMENDATIONS);
    ranked
}
