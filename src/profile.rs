/// Profile extraction from free-text chat messages
///
/// Each rule below is checked independently against the message; every rule
/// that matches contributes a field to the returned delta. Nothing here ever
/// clears a field: a signal missing from the message simply leaves the key
/// out of the delta.
use crate::models::{Budget, InternetUsage, Priority, ProfileDelta, UserProfile};
use regex::Regex;
use std::sync::LazyLock;

static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9]{5}(?-u:\b)").expect("zip pattern is valid"));

static DOLLAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$([0-9]+)").expect("dollar pattern is valid"));

static HOUSEHOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s+(people|person|family)").expect("household pattern is valid")
});

const WORK_FROM_HOME_KEYWORDS: [&str; 3] = ["work from home", "remote work", "home office"];
const HEAVY_USAGE_KEYWORDS: [&str; 3] = ["streaming", "gaming", "video calls"];
const LIGHT_USAGE_KEYWORDS: [&str; 2] = ["basic", "email"];

/// Priority tags in scan order; the output keeps this order.
const PRIORITY_KEYWORDS: [(Priority, &[&str]); 3] = [
    (Priority::Price, &["cheap", "budget", "affordable"]),
    (Priority::Reliability, &["reliable", "dependable"]),
    (Priority::Speed, &["fast", "speed"]),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// First standalone run of exactly five digits, if any.
pub fn find_zip_code(message: &str) -> Option<&str> {
    ZIP_RE.find(message).map(|m| m.as_str())
}

/// Parse a message into the profile fields it mentions.
///
/// Pure function of `(message, current)`: `current` is only read so that a
/// budget update carries forward the budget fields already known.
pub fn extract(message: &str, current: &UserProfile) -> ProfileDelta {
    let lower = message.to_lowercase();
    let mut delta = ProfileDelta::default();

    if let Some(zip) = find_zip_code(message) {
        delta.zip_code = Some(zip.to_string());
    }

    if let Some(budget) = extract_budget(message, &lower, current) {
        delta.budget = Some(budget);
    }

    if let Some(size) = HOUSEHOLD_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|size| *size > 0)
    {
        delta.household_size = Some(size);
    }

    if contains_any(&lower, &WORK_FROM_HOME_KEYWORDS) {
        delta.work_from_home = Some(true);
    }

    if contains_any(&lower, &HEAVY_USAGE_KEYWORDS) {
        delta.internet_usage = Some(InternetUsage::Heavy);
    } else if contains_any(&lower, &LIGHT_USAGE_KEYWORDS) {
        delta.internet_usage = Some(InternetUsage::Light);
    }

    let priorities: Vec<Priority> = PRIORITY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(priority, _)| *priority)
        .collect();
    if !priorities.is_empty() {
        delta.priorities = Some(priorities);
    }

    delta
}

/// A `$<amount>` figure only counts as a budget when the message says
/// "budget", and only the internet and total budgets are recognised.
fn extract_budget(message: &str, lower: &str, current: &UserProfile) -> Option<Budget> {
    if !lower.contains("budget") {
        return None;
    }

    let amount = DOLLAR_RE
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())? as f64;

    let mut update = Budget::default();
    if lower.contains("internet") {
        update.internet = Some(amount);
    } else if lower.contains("total") {
        update.total = Some(amount);
    } else {
        tracing::debug!("Budget amount ${} has no recognised category, dropping", amount);
        return None;
    }

    let existing = current.budget.clone().unwrap_or_default();
    Some(existing.merged_with(&update))
}

/// Apply a delta on top of a profile.
///
/// Top-level fields present in `delta` replace those in `base`; absent ones
/// keep the base value. `budget` is merged one level deeper with the same
/// rule, so a delta carrying only `budget.internet` keeps `budget.total`.
pub fn merge(base: &UserProfile, delta: &ProfileDelta) -> UserProfile {
    let budget = match (&base.budget, &delta.budget) {
        (Some(existing), Some(update)) => Some(existing.merged_with(update)),
        (existing, update) => update.clone().or_else(|| existing.clone()),
    };

    UserProfile {
        zip_code: delta.zip_code.clone().or_else(|| base.zip_code.clone()),
        address: delta.address.clone().or_else(|| base.address.clone()),
        household_size: delta.household_size.or(base.household_size),
        budget,
        work_from_home: delta.work_from_home.or(base.work_from_home),
        internet_usage: delta.internet_usage.or(base.internet_usage),
        priorities: delta
            .priorities
            .clone()
            .or_else(|| base.priorities.clone()),
        current_providers: delta
            .current_providers
            .clone()
            .or_else(|| base.current_providers.clone()),
    }
}
