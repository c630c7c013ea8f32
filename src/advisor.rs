/// Conversation orchestration for the utility advisor
///
/// One inbound message runs through these steps, in order:
/// 1. Extract profile updates from the message and merge them
/// 2. Fetch providers and bundles for the profile's ZIP code (if known)
/// 3. Generate the reply
/// 4. Rank provider recommendations
/// 5. Rank bundle recommendations
use crate::errors::AppError;
use crate::models::{Bundle, ChatTurn, ProfileDelta, Provider, UserProfile};
use crate::profile;
use crate::ranker;
use crate::responder::{ReplyInput, ResponseGenerator};
use crate::source::ProviderSource;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// Result of handling one message.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub reply: String,
    /// Only the fields found in this message; the caller merges it.
    pub profile_delta: ProfileDelta,
    /// The merged profile the turn was answered with.
    pub profile: UserProfile,
    pub provider_recommendations: Vec<Provider>,
    pub bundle_recommendations: Vec<Bundle>,
}

/// Composes extraction, lookup, reply generation and ranking.
#[derive(Clone)]
pub struct Advisor {
    source: Arc<dyn ProviderSource>,
    generator: ResponseGenerator,
}

impl Advisor {
    pub fn new(source: Arc<dyn ProviderSource>, generator: ResponseGenerator) -> Self {
        Self { source, generator }
    }

    pub fn source(&self) -> &Arc<dyn ProviderSource> {
        &self.source
    }

    /// Whether replies come from the completion delegate.
    pub fn is_delegated(&self) -> bool {
        self.generator.is_delegated()
    }

    /// Handle one inbound message.
    ///
    /// Source failures degrade to empty lists and delegate failures to a
    /// rule-based reply, so the only error returned is an unusable message.
    pub async fn handle_turn(
        &self,
        message: &str,
        history: &[ChatTurn],
        current: &UserProfile,
    ) -> Result<TurnOutcome, AppError> {
        if message.trim().is_empty() {
            return Err(AppError::BadRequest("Message is required".to_string()));
        }

        let turn_id = Uuid::new_v4();
        self.run_turn(message, history, current)
            .instrument(tracing::info_span!("turn", %turn_id))
            .await
    }

    async fn run_turn(
        &self,
        message: &str,
        history: &[ChatTurn],
        current: &UserProfile,
    ) -> Result<TurnOutcome, AppError> {
        // Step 1: Extract and merge
        let profile_delta = profile::extract(message, current);
        let profile = profile::merge(current, &profile_delta);
        tracing::debug!("Profile delta: {:?}", profile_delta);

        // Step 2: Look up the area
        let (providers, bundles) = match profile.zip_code.as_deref() {
            Some(zip) => self.load_area(zip).await,
            None => {
                tracing::debug!("No ZIP code yet, skipping provider lookup");
                (Vec::new(), Vec::new())
            }
        };

        // Step 3: Reply
        let reply = self
            .generator
            .generate(ReplyInput {
                user_message: message,
                history,
                profile: &profile,
                providers: &providers,
                bundles: &bundles,
            })
            .await;

        // Steps 4-5: Recommendations
        let provider_recommendations = ranker::rank_providers(message, &profile, &providers);
        let bundle_recommendations = ranker::rank_bundles(message, &profile, &bundles);

        tracing::info!(
            "Turn answered: zip={:?}, {} provider(s), {} bundle(s), recommending {} provider(s) and {} bundle(s)",
            profile.zip_code,
            providers.len(),
            bundles.len(),
            provider_recommendations.len(),
            bundle_recommendations.len()
        );

        Ok(TurnOutcome {
            reply,
            profile_delta,
            profile,
            provider_recommendations,
            bundle_recommendations,
        })
    }

    /// Providers and bundles for a ZIP code. A failed provider query yields
    /// nothing; a failed bundle query keeps the providers.
    async fn load_area(&self, zip_code: &str) -> (Vec<Provider>, Vec<Bundle>) {
        let providers = match self.source.providers_for_zip(zip_code).await {
            Ok(providers) => providers,
            Err(e) => {
                tracing::error!(
                    "Provider lookup via '{}' failed for ZIP {}: {}",
                    self.source.name(),
                    zip_code,
                    e
                );
                return (Vec::new(), Vec::new());
            }
        };

        let bundles = match self.source.bundles_for_zip(zip_code).await {
            Ok(bundles) => bundles,
            Err(e) => {
                tracing::error!(
                    "Bundle lookup via '{}' failed for ZIP {}: {}",
                    self.source.name(),
                    zip_code,
                    e
                );
                Vec::new()
            }
        };

        (providers, bundles)
    }
}
