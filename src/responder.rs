use crate::completion::{CompletionRequest, TextCompletion};
use crate::errors::AppError;
use crate::models::{Bundle, ChatTurn, Provider, UserProfile};
use crate::rules::{self, RuleContext};
use std::sync::Arc;

/// How many prior turns are forwarded to the delegate.
pub const HISTORY_WINDOW: usize = 10;
/// How many providers are embedded in the system instruction.
pub const PROMPT_PROVIDER_LIMIT: usize = 10;
/// How many bundles are embedded in the system instruction.
pub const PROMPT_BUNDLE_LIMIT: usize = 5;

const ADVISOR_PERSONA: &str = "You are an expert utility advisor for ConnectPortal247. You help users find the best electricity, internet, cellular, and waste management providers in their area.

Your personality: Friendly, knowledgeable, and helpful. Always explain your reasoning clearly.";

const ADVISOR_GUIDELINES: &str = "Guidelines:
1. Ask clarifying questions to understand their needs
2. Recommend specific providers with clear reasoning
3. Highlight bundle savings opportunities when relevant
4. Keep responses conversational and helpful
5. If they ask about pricing, mention they should verify with providers directly
6. Focus on their priorities (price, speed, reliability, etc.)";

/// Everything needed to answer one message.
#[derive(Debug, Clone, Copy)]
pub struct ReplyInput<'a> {
    pub user_message: &'a str,
    pub history: &'a [ChatTurn],
    pub profile: &'a UserProfile,
    pub providers: &'a [Provider],
    pub bundles: &'a [Bundle],
}

/// Produces the assistant's reply for a turn.
///
/// With a delegate configured, the reply comes from the external completion
/// service; any failure there is logged and answered by the rule-based
/// strategy instead. Without a delegate, replies are always rule-based.
#[derive(Clone)]
pub struct ResponseGenerator {
    delegate: Option<Arc<dyn TextCompletion>>,
}

impl ResponseGenerator {
    pub fn new(delegate: Option<Arc<dyn TextCompletion>>) -> Self {
        Self { delegate }
    }

    pub fn rule_based() -> Self {
        Self { delegate: None }
    }

    pub fn is_delegated(&self) -> bool {
        self.delegate.is_some()
    }

    /// Never fails: delegate errors end in the rule-based reply.
    pub async fn generate(&self, input: ReplyInput<'_>) -> String {
        let Some(delegate) = &self.delegate else {
            return rule_based_reply(&input);
        };

        match delegated_reply(delegate.as_ref(), &input).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    "Completion delegate '{}' failed, using rule-based reply: {}",
                    delegate.name(),
                    e
                );
                rule_based_reply(&input)
            }
        }
    }
}

/// The deterministic reply for `input`.
pub fn rule_based_reply(input: &ReplyInput<'_>) -> String {
    let ctx = RuleContext::new(input.user_message, input.profile, input.providers, input.bundles);
    rules::respond(&ctx)
}

async fn delegated_reply(
    delegate: &dyn TextCompletion,
    input: &ReplyInput<'_>,
) -> Result<String, AppError> {
    let system = build_system_prompt(input.profile, input.providers, input.bundles)?;
    let skip = input.history.len().saturating_sub(HISTORY_WINDOW);

    let request = CompletionRequest {
        system,
        history: input.history[skip..].to_vec(),
        user_message: input.user_message.to_string(),
    };

    delegate.complete(request).await
}

/// System instruction carrying the profile and the area's providers/bundles.
pub fn build_system_prompt(
    profile: &UserProfile,
    providers: &[Provider],
    bundles: &[Bundle],
) -> Result<String, AppError> {
    let to_json = |value: serde_json::Result<String>| {
        value.map_err(|e| AppError::InternalError(format!("Failed to serialize prompt data: {}", e)))
    };

    let profile_json = to_json(serde_json::to_string(profile))?;
    let providers_json = to_json(serde_json::to_string(
        &providers[..providers.len().min(PROMPT_PROVIDER_LIMIT)],
    ))?;
    let bundles_json = to_json(serde_json::to_string(
        &bundles[..bundles.len().min(PROMPT_BUNDLE_LIMIT)],
    ))?;

    Ok(format!(
        "{}\n\nCurrent user profile: {}\nAvailable providers: {} providers in their area\nAvailable bundles: {} bundle deals\n\n{}\n\nProvider data: {}\nBundle data: {}",
        ADVISOR_PERSONA,
        profile_json,
        providers.len(),
        bundles.len(),
        ADVISOR_GUIDELINES,
        providers_json,
        bundles_json
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChatRole;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FailingDelegate;

    #[async_trait]
    impl TextCompletion for FailingDelegate {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, AppError> {
            Err(AppError::ExternalApiError("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingDelegate {
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl TextCompletion for RecordingDelegate {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, AppError> {
            self.seen.lock().unwrap().push(request);
            Ok("delegated reply".to_string())
        }
    }

    fn input<'a>(message: &'a str, history: &'a [ChatTurn], profile: &'a UserProfile) -> ReplyInput<'a> {
        ReplyInput {
            user_message: message,
            history,
            profile,
            providers: &[],
            bundles: &[],
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_rule_based() {
        let profile = UserProfile::default();
        let input = input("hello", &[], &profile);

        let generator = ResponseGenerator::new(Some(Arc::new(FailingDelegate)));
        let reply = generator.generate(input).await;

        assert_eq!(reply, rule_based_reply(&input));
        assert_eq!(reply, rules::GREETING);
    }

    #[tokio::test]
    async fn test_delegate_gets_last_ten_turns() {
        let history: Vec<ChatTurn> = (0..14)
            .map(|i| ChatTurn::new(ChatRole::User, format!("turn {}", i)))
            .collect();
        let profile = UserProfile {
            zip_code: Some("43215".to_string()),
            ..Default::default()
        };
        let delegate = Arc::new(RecordingDelegate::default());
        let generator = ResponseGenerator::new(Some(delegate.clone()));

        let reply = generator.generate(input("internet?", &history, &profile)).await;
        assert_eq!(reply, "delegated reply");

        let seen = delegate.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.history.len(), HISTORY_WINDOW);
        assert_eq!(request.history[0].content, "turn 4");
        assert_eq!(request.user_message, "internet?");
        assert!(request.system.contains(r#"Current user profile: {"zipCode":"43215"}"#));
    }

    #[test]
    fn test_system_prompt_counts() {
        let prompt = build_system_prompt(&UserProfile::default(), &[], &[]).unwrap();
        assert!(prompt.contains("Available providers: 0 providers in their area"));
        assert!(prompt.contains("Available bundles: 0 bundle deals"));
        assert!(prompt.contains("Provider data: []"));
    }

    #[test]
    fn test_system_prompt_embeds_only_leading_entries() {
        let providers: Vec<Provider> = (0..12)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "id": format!("p{}", i),
                    "name": format!("Provider {}", i),
                    "type": "internet"
                }))
                .unwrap()
            })
            .collect();
        let bundles: Vec<Bundle> = (0..7)
            .map(|i| {
                serde_json::from_value(serde_json::json!({
                    "id": format!("b{}", i),
                    "bundle_name": format!("Bundle {}", i)
                }))
                .unwrap()
            })
            .collect();

        let prompt = build_system_prompt(&UserProfile::default(), &providers, &bundles).unwrap();
        assert!(prompt.contains("Available providers: 12 providers in their area"));
        assert!(prompt.contains("Available bundles: 7 bundle deals"));

        let (_, data) = prompt.split_once("Provider data: ").unwrap();
        let (provider_data, bundle_data) = data.split_once("\nBundle data: ").unwrap();
        let embedded_providers: Vec<serde_json::Value> =
            serde_json::from_str(provider_data).unwrap();
        let embedded_bundles: Vec<serde_json::Value> = serde_json::from_str(bundle_data).unwrap();

        assert_eq!(embedded_providers.len(), PROMPT_PROVIDER_LIMIT);
        assert_eq!(embedded_providers[0]["id"], "p0");
        assert_eq!(embedded_providers[9]["id"], "p9");
        assert_eq!(embedded_bundles.len(), PROMPT_BUNDLE_LIMIT);
        assert_eq!(embedded_bundles[4]["id"], "b4");
    }
}
