/// Provider and bundle data sources
///
/// A source answers two questions: which providers serve a ZIP code, and
/// which bundle deals exist. Empty answers are not errors; query-layer
/// failures are, and the caller decides whether to degrade.
use crate::errors::{AppError, ResultExt};
use crate::models::{Bundle, Provider, ServiceType};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

#[async_trait]
pub trait ProviderSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Providers serving `zip_code`, best overall score first.
    async fn providers_for_zip(&self, zip_code: &str) -> Result<Vec<Provider>, AppError>;

    /// Bundle deals available to `zip_code`, largest monthly savings first.
    async fn bundles_for_zip(&self, zip_code: &str) -> Result<Vec<Bundle>, AppError>;
}

#[derive(Debug, FromRow)]
struct ProviderRow {
    id: String,
    name: String,
    provider_type: String,
    phone: Option<String>,
    website: Option<String>,
    description: Option<String>,
    service_areas: Vec<String>,
    rating: f64,
    overall_score: f64,
    popularity_score: f64,
    coverage_score: f64,
    price_score: f64,
    cellular_network: Option<String>,
    cellular_plans: Option<serde_json::Value>,
    requires_internet_subscription: Option<bool>,
    bundle_options: Option<serde_json::Value>,
}

impl ProviderRow {
    fn into_provider(self) -> Option<Provider> {
        let service_type = match self.provider_type.parse::<ServiceType>() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("Skipping provider {} ({}): {}", self.id, self.name, e);
                return None;
            }
        };

        Some(Provider {
            id: self.id,
            name: self.name,
            service_type,
            phone: self.phone,
            website: self.website,
            description: self.description.unwrap_or_default(),
            service_areas: self.service_areas,
            rating: self.rating,
            overall_score: self.overall_score,
            popularity_score: self.popularity_score,
            coverage_score: self.coverage_score,
            price_score: self.price_score,
            cellular_network: self.cellular_network,
            cellular_plans: self.cellular_plans,
            requires_internet_subscription: self.requires_internet_subscription,
            bundle_options: self.bundle_options,
            price_range: None,
            connection_time: None,
            service_area: None,
        })
    }
}

#[derive(Debug, FromRow)]
struct BundleRow {
    id: String,
    bundle_name: String,
    provider_name: Option<String>,
    services: Vec<String>,
    monthly_price: f64,
    monthly_savings: f64,
    annual_savings: f64,
    description: Option<String>,
    requirements: Option<serde_json::Value>,
    features: Option<serde_json::Value>,
}

impl From<BundleRow> for Bundle {
    fn from(row: BundleRow) -> Self {
        Bundle {
            id: row.id,
            bundle_name: row.bundle_name,
            provider_name: row.provider_name,
            services: row.services,
            monthly_price: row.monthly_price,
            monthly_savings: row.monthly_savings,
            annual_savings: row.annual_savings,
            description: row.description.unwrap_or_default(),
            requirements: row.requirements,
            features: row.features,
        }
    }
}

/// Directory stored in Postgres (`providers` and `service_bundles` tables).
#[derive(Clone)]
pub struct PgProviderSource {
    pool: PgPool,
}

impl PgProviderSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProviderSource for PgProviderSource {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn providers_for_zip(&self, zip_code: &str) -> Result<Vec<Provider>, AppError> {
        // Numeric and array columns are normalised in SQL so the row shape
        // does not depend on the exact column types of the hosted schema.
        let rows = sqlx::query_as::<_, ProviderRow>(
            r#"
            SELECT id::text AS id,
                   name,
                   type::text AS provider_type,
                   phone,
                   website,
                   description,
                   COALESCE(service_areas, '{}')::text[] AS service_areas,
                   COALESCE(rating, 0)::float8 AS rating,
                   COALESCE(overall_score, 0)::float8 AS overall_score,
                   COALESCE(popularity_score, 0)::float8 AS popularity_score,
                   COALESCE(coverage_score, 0)::float8 AS coverage_score,
                   COALESCE(price_score, 0)::float8 AS price_score,
                   cellular_network,
                   to_jsonb(cellular_plans) AS cellular_plans,
                   requires_internet_subscription,
                   to_jsonb(bundle_options) AS bundle_options
            FROM providers
            WHERE service_areas @> ARRAY[$1]::text[]
            ORDER BY overall_score DESC NULLS LAST
            "#,
        )
        .bind(zip_code)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("loading providers for ZIP {}", zip_code))?;

        let total = rows.len();
        let providers: Vec<Provider> = rows
            .into_iter()
            .filter_map(ProviderRow::into_provider)
            .collect();
        tracing::debug!(
            "Loaded {} provider(s) for ZIP {} ({} skipped)",
            providers.len(),
            zip_code,
            total - providers.len()
        );

        Ok(providers)
    }

    async fn bundles_for_zip(&self, _zip_code: &str) -> Result<Vec<Bundle>, AppError> {
        // Bundles are not area-scoped in the directory schema.
        let rows = sqlx::query_as::<_, BundleRow>(
            r#"
            SELECT id::text AS id,
                   bundle_name,
                   provider_name,
                   COALESCE(services, '{}')::text[] AS services,
                   COALESCE(monthly_price, 0)::float8 AS monthly_price,
                   COALESCE(monthly_savings, 0)::float8 AS monthly_savings,
                   COALESCE(annual_savings, 0)::float8 AS annual_savings,
                   description,
                   to_jsonb(requirements) AS requirements,
                   to_jsonb(features) AS features
            FROM service_bundles
            ORDER BY monthly_savings DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("loading service bundles")?;

        Ok(rows.into_iter().map(Bundle::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(provider_type: &str) -> ProviderRow {
        ProviderRow {
            id: "1".to_string(),
            name: "Rumpke".to_string(),
            provider_type: provider_type.to_string(),
            phone: Some("1-800-828-8171".to_string()),
            website: None,
            description: None,
            service_areas: vec!["43215".to_string()],
            rating: 4.2,
            overall_score: 81.0,
            popularity_score: 70.0,
            coverage_score: 65.0,
            price_score: 77.0,
            cellular_network: None,
            cellular_plans: None,
            requires_internet_subscription: None,
            bundle_options: None,
        }
    }

    #[test]
    fn test_row_conversion() {
        let provider = row("trash").into_provider().unwrap();
        assert_eq!(provider.service_type, ServiceType::Waste);
        assert_eq!(provider.description, "");
        assert_eq!(provider.overall_score, 81.0);
    }

    #[test]
    fn test_unknown_type_is_skipped() {
        assert!(row("satellite").into_provider().is_none());
    }
}
