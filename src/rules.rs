/// Rule-based replies for the utility advisor chat
///
/// Rules are evaluated in declaration order. A rule whose trigger matches may
/// still decline (return `None`), e.g. an internet question when no internet
/// provider serves the area, in which case evaluation continues with the next
/// rule. The last rule always answers.
use crate::models::{Bundle, Provider, ServiceType, UserProfile};
use regex::Regex;
use std::sync::LazyLock;

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{5}").expect("digit run pattern is valid"));

/// How many entries a listing reply shows.
const LISTING_LIMIT: usize = 3;

pub const ASK_FOR_ZIP: &str =
    "I'd be happy to help! What's your ZIP code so I can find providers in your area?";

pub const GREETING: &str = "Hi! I'm your AI utility advisor. I can help you find the best internet, cellular, electricity, and waste management providers in your area, plus identify bundle savings opportunities. What's your ZIP code?";

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub message: &'a str,
    pub lower: String,
    pub profile: &'a UserProfile,
    pub providers: &'a [Provider],
    pub bundles: &'a [Bundle],
}

impl<'a> RuleContext<'a> {
    pub fn new(
        message: &'a str,
        profile: &'a UserProfile,
        providers: &'a [Provider],
        bundles: &'a [Bundle],
    ) -> Self {
        Self {
            message,
            lower: message.to_lowercase(),
            profile,
            providers,
            bundles,
        }
    }

    fn mentions_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.lower.contains(k))
    }

    fn providers_of(&self, service: ServiceType) -> impl Iterator<Item = &'a Provider> {
        self.providers
            .iter()
            .filter(move |p| p.service_type == service)
    }

    fn count_of(&self, service: ServiceType) -> usize {
        self.providers_of(service).count()
    }
}

/// A (trigger, handler) pair.
pub struct Rule {
    pub name: &'static str,
    pub triggers: fn(&RuleContext) -> bool,
    pub respond: fn(&RuleContext) -> Option<String>,
}

/// The reply cascade, highest priority first.
pub static RULES: [Rule; 6] = [
    Rule {
        name: "zip_code",
        triggers: |ctx| {
            ctx.profile.zip_code.is_none()
                && (ctx.lower.contains("zip") || DIGIT_RUN_RE.is_match(ctx.message))
        },
        respond: zip_code_reply,
    },
    Rule {
        name: "internet",
        triggers: |ctx| ctx.mentions_any(&["internet", "wifi", "broadband"]),
        respond: internet_reply,
    },
    Rule {
        name: "cellular",
        triggers: |ctx| ctx.mentions_any(&["mobile", "cell", "phone"]),
        respond: cellular_reply,
    },
    Rule {
        name: "bundles",
        triggers: |ctx| ctx.mentions_any(&["bundle", "package", "save"]),
        respond: bundle_reply,
    },
    Rule {
        name: "budget",
        triggers: |ctx| ctx.mentions_any(&["budget", "cheap", "affordable"]),
        respond: budget_reply,
    },
    Rule {
        name: "default",
        triggers: |_| true,
        respond: |ctx| Some(default_reply(ctx)),
    },
];

/// Run the cascade and return the first reply produced.
pub fn respond(ctx: &RuleContext) -> String {
    for rule in RULES.iter() {
        if !(rule.triggers)(ctx) {
            continue;
        }
        if let Some(reply) = (rule.respond)(ctx) {
            tracing::debug!("Rule-based reply produced by rule '{}'", rule.name);
            return reply;
        }
    }
    default_reply(ctx)
}

fn medal(index: usize) -> &'static str {
    match index {
        0 => "🥇",
        1 => "🥈",
        _ => "🥉",
    }
}

fn zip_code_reply(ctx: &RuleContext) -> Option<String> {
    let Some(zip) = crate::profile::find_zip_code(ctx.message) else {
        return Some(ASK_FOR_ZIP.to_string());
    };

    Some(format!(
        "Great! I found {} providers in ZIP code {}. What type of service are you looking for? I can help with:\n\n\
         📶 Internet service\n\
         📱 Mobile/cellular plans\n\
         ⚡ Electricity providers\n\
         🗑️ Waste management\n\
         📦 Bundle deals (save $10-30/month)",
        ctx.providers.len(),
        zip
    ))
}

fn internet_reply(ctx: &RuleContext) -> Option<String> {
    let top: Vec<&Provider> = ctx
        .providers_of(ServiceType::Internet)
        .take(LISTING_LIMIT)
        .collect();
    if top.is_empty() {
        return None;
    }

    let mut reply = String::from("Here are the top internet providers in your area:\n\n");
    for (index, provider) in top.iter().enumerate() {
        reply.push_str(&format!(
            "{} **{}** (Score: {}/100)\n{}\n\n",
            medal(index),
            provider.name,
            provider.overall_score,
            provider.description
        ));
    }

    if ctx.profile.work_from_home == Some(true) {
        reply.push_str("Since you work from home, I'd especially recommend fiber or cable internet for reliable video calls. ");
    }
    reply.push_str("Would you like details about any of these providers?");
    Some(reply)
}

fn cellular_reply(ctx: &RuleContext) -> Option<String> {
    let top: Vec<&Provider> = ctx
        .providers_of(ServiceType::Cellular)
        .take(LISTING_LIMIT)
        .collect();
    if top.is_empty() {
        return None;
    }

    let mut reply = String::from("Here are your cellular options:\n\n");
    for provider in &top {
        reply.push_str(&format!("📱 **{}**\n", provider.name));
        if let Some(network) = &provider.cellular_network {
            reply.push_str(&format!("Network: {}\n", network));
        }
        if provider.requires_internet_subscription == Some(true) {
            reply.push_str("⚠️ Requires internet subscription\n");
        }
        reply.push_str(&format!("{}\n\n", provider.description));
    }

    let combo = ctx
        .bundles
        .iter()
        .find(|b| b.includes(ServiceType::Internet) && b.includes(ServiceType::Cellular));
    if let Some(bundle) = combo {
        reply.push_str(&format!(
            "💰 **Bundle Opportunity**: Save ${}/month by bundling internet + mobile!",
            bundle.monthly_savings
        ));
    }

    Some(reply.trim_end().to_string())
}

fn bundle_reply(ctx: &RuleContext) -> Option<String> {
    if ctx.bundles.is_empty() {
        return None;
    }

    let mut reply = String::from("Here are the best bundle deals in your area:\n\n");
    for (index, bundle) in ctx.bundles.iter().take(LISTING_LIMIT).enumerate() {
        reply.push_str(&format!(
            "{} **{}**\n💰 Save ${}/month (${}/year)\nServices: {}\n{}\n\n",
            medal(index),
            bundle.bundle_name,
            bundle.monthly_savings,
            bundle.annual_savings,
            bundle.services.join(" + "),
            bundle.description
        ));
    }
    Some(reply.trim_end().to_string())
}

fn budget_reply(ctx: &RuleContext) -> Option<String> {
    let mut cheapest: Vec<&Provider> = ctx.providers.iter().collect();
    cheapest.sort_by(|a, b| b.price_score.total_cmp(&a.price_score));
    cheapest.truncate(LISTING_LIMIT);
    if cheapest.is_empty() {
        return None;
    }

    let mut reply = String::from("Here are the most budget-friendly options:\n\n");
    for provider in cheapest {
        reply.push_str(&format!(
            "💰 **{}** (Price Score: {}/100)\n{}\n\n",
            provider.name, provider.price_score, provider.description
        ));
    }
    Some(reply.trim_end().to_string())
}

fn default_reply(ctx: &RuleContext) -> String {
    if ctx.profile.zip_code.is_none() {
        return GREETING.to_string();
    }

    format!(
        "I can help you with:\n\n\
         📶 Internet providers ({} options)\n\
         📱 Mobile/cellular plans ({} options)\n\
         ⚡ Electricity providers ({} options)\n\
         🗑️ Waste management ({} options)\n\
         📦 Bundle deals ({} available)\n\n\
         What would you like to explore?",
        ctx.count_of(ServiceType::Internet),
        ctx.count_of(ServiceType::Cellular),
        ctx.count_of(ServiceType::Electricity),
        ctx.count_of(ServiceType::Waste),
        ctx.bundles.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, service_type: ServiceType, overall: f64, price: f64) -> Provider {
        Provider {
            id: name.to_lowercase(),
            name: name.to_string(),
            service_type,
            phone: None,
            website: None,
            description: format!("{} description", name),
            service_areas: vec!["43215".to_string()],
            rating: 4.0,
            overall_score: overall,
            popularity_score: 0.0,
            coverage_score: 0.0,
            price_score: price,
            cellular_network: None,
            cellular_plans: None,
            requires_internet_subscription: None,
            bundle_options: None,
            price_range: None,
            connection_time: None,
            service_area: None,
        }
    }

    fn bundle(name: &str, services: &[&str], savings: f64) -> Bundle {
        Bundle {
            id: name.to_lowercase(),
            bundle_name: name.to_string(),
            provider_name: None,
            services: services.iter().map(|s| s.to_string()).collect(),
            monthly_price: 120.0,
            monthly_savings: savings,
            annual_savings: savings * 12.0,
            description: format!("{} description", name),
            requirements: None,
            features: None,
        }
    }

    fn zip_profile() -> UserProfile {
        UserProfile {
            zip_code: Some("43215".to_string()),
            ..Default::default()
        }
    }

    fn reply(message: &str, profile: &UserProfile, providers: &[Provider], bundles: &[Bundle]) -> String {
        respond(&RuleContext::new(message, profile, providers, bundles))
    }

    #[test]
    fn test_zip_acknowledged_with_provider_count() {
        let providers: Vec<Provider> = (0..5)
            .map(|i| provider(&format!("P{}", i), ServiceType::Internet, 50.0, 50.0))
            .collect();

        let text = reply("43215", &UserProfile::default(), &providers, &[]);
        assert!(text.contains("5 providers"));
        assert!(text.contains("43215"));
        assert!(text.contains("Bundle deals"));
    }

    #[test]
    fn test_asks_for_zip_when_missing() {
        let text = reply("what's a zip for?", &UserProfile::default(), &[], &[]);
        assert_eq!(text, ASK_FOR_ZIP);
    }

    #[test]
    fn test_internet_listing_with_medals_and_wfh_note() {
        let providers = vec![
            provider("Spectrum", ServiceType::Internet, 88.0, 60.0),
            provider("AEP Ohio", ServiceType::Electricity, 90.0, 70.0),
            provider("WOW", ServiceType::Internet, 75.0, 80.0),
        ];
        let profile = UserProfile {
            work_from_home: Some(true),
            ..zip_profile()
        };

        let text = reply("Which internet is best?", &profile, &providers, &[]);
        assert!(text.starts_with("Here are the top internet providers"));
        assert!(text.contains("🥇 **Spectrum** (Score: 88/100)"));
        assert!(text.contains("🥈 **WOW**"));
        assert!(!text.contains("AEP Ohio"));
        assert!(text.contains("Since you work from home"));
        assert!(text.ends_with("Would you like details about any of these providers?"));
    }

    #[test]
    fn test_internet_without_providers_falls_through() {
        let providers = vec![provider("AEP Ohio", ServiceType::Electricity, 90.0, 70.0)];
        let text = reply("internet", &zip_profile(), &providers, &[]);
        assert!(text.starts_with("I can help you with:"));
        assert!(text.contains("Electricity providers (1 options)"));
    }

    #[test]
    fn test_cellular_listing_with_bundle_callout() {
        let mut visible = provider("Visible", ServiceType::Cellular, 70.0, 90.0);
        visible.cellular_network = Some("Verizon".to_string());
        let mut xfinity = provider("Xfinity Mobile", ServiceType::Cellular, 72.0, 85.0);
        xfinity.requires_internet_subscription = Some(true);

        let bundles = vec![
            bundle("Power Pack", &["internet", "electricity"], 12.0),
            bundle("Connect Duo", &["internet", "cellular"], 20.0),
        ];

        let text = reply("cheaper phone plan", &zip_profile(), &[visible, xfinity], &bundles);
        assert!(text.contains("Network: Verizon"));
        assert!(text.contains("⚠️ Requires internet subscription"));
        assert!(text.contains("Save $20/month by bundling internet + mobile!"));
    }

    #[test]
    fn test_bundle_listing() {
        let bundles = vec![bundle("Connect Duo", &["internet", "cellular"], 20.0)];
        let text = reply("any packages?", &zip_profile(), &[], &bundles);
        assert!(text.contains("🥇 **Connect Duo**"));
        assert!(text.contains("Save $20/month ($240/year)"));
        assert!(text.contains("Services: internet + cellular"));
    }

    #[test]
    fn test_budget_listing_sorted_by_price_score() {
        let providers = vec![
            provider("Pricey", ServiceType::Electricity, 90.0, 20.0),
            provider("Cheap", ServiceType::Waste, 60.0, 95.0),
        ];
        let text = reply("something affordable", &zip_profile(), &providers, &[]);
        let cheap_at = text.find("Cheap").unwrap();
        let pricey_at = text.find("Pricey").unwrap();
        assert!(cheap_at < pricey_at);
        assert!(text.contains("(Price Score: 95/100)"));
    }

    #[test]
    fn test_default_greeting_without_zip() {
        assert_eq!(reply("hello", &UserProfile::default(), &[], &[]), GREETING);
    }

    #[test]
    fn test_default_menu_counts() {
        let providers = vec![
            provider("A", ServiceType::Internet, 1.0, 1.0),
            provider("B", ServiceType::Internet, 1.0, 1.0),
            provider("C", ServiceType::Waste, 1.0, 1.0),
        ];
        let bundles = vec![bundle("Duo", &["internet", "cellular"], 5.0)];
        let text = reply("hello", &zip_profile(), &providers, &bundles);
        assert!(text.contains("Internet providers (2 options)"));
        assert!(text.contains("Waste management (1 options)"));
        assert!(text.contains("Bundle deals (1 available)"));
    }

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec!["zip_code", "internet", "cellular", "bundles", "budget", "default"]
        );
    }
}
