/// Built-in provider directory for the launch cities
///
/// Used as the provider source when no database is configured. Providers are
/// keyed by city; a city is picked from address keywords or the ZIP code.
/// Areas outside the covered cities fall back to Columbus.
use crate::errors::AppError;
use crate::models::{Bundle, Provider, ServiceType};
use crate::source::ProviderSource;
use async_trait::async_trait;

/// A city the directory covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum City {
    Detroit,
    Columbus,
    Indianapolis,
    AnnArbor,
    Toledo,
}

impl City {
    pub const ALL: [City; 5] = [
        City::Detroit,
        City::Columbus,
        City::Indianapolis,
        City::AnnArbor,
        City::Toledo,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            City::Detroit => "detroit",
            City::Columbus => "columbus",
            City::Indianapolis => "indianapolis",
            City::AnnArbor => "ann-arbor",
            City::Toledo => "toledo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            City::Detroit => "Detroit, MI",
            City::Columbus => "Columbus, OH",
            City::Indianapolis => "Indianapolis, IN",
            City::AnnArbor => "Ann Arbor, MI",
            City::Toledo => "Toledo, OH",
        }
    }
}

/// Matching rule for one city.
struct CityRule {
    city: City,
    address_keywords: &'static [&'static str],
    zip_codes: &'static [&'static str],
    zip_prefixes: &'static [&'static str],
}

impl CityRule {
    fn matches(&self, address: &str, zip: &str) -> bool {
        self.address_keywords.iter().any(|k| address.contains(k))
            || self.zip_codes.contains(&zip)
            || self.zip_prefixes.iter().any(|p| zip.starts_with(p))
    }
}

/// Most specific areas first: Ann Arbor's ZIPs sit inside Detroit's "48"
/// prefix and Toledo's "436" inside Columbus' "43".
const CITY_RULES: [CityRule; 5] = [
    CityRule {
        city: City::AnnArbor,
        address_keywords: &["ann arbor", "annarbor"],
        zip_codes: &["48104", "48105", "48108"],
        zip_prefixes: &[],
    },
    CityRule {
        city: City::Toledo,
        address_keywords: &["toledo"],
        zip_codes: &[],
        zip_prefixes: &["436"],
    },
    CityRule {
        city: City::Detroit,
        address_keywords: &["detroit"],
        zip_codes: &[],
        zip_prefixes: &["48"],
    },
    CityRule {
        city: City::Columbus,
        address_keywords: &["columbus"],
        zip_codes: &[],
        zip_prefixes: &["43"],
    },
    CityRule {
        city: City::Indianapolis,
        address_keywords: &["indianapolis", "indy"],
        zip_codes: &[],
        zip_prefixes: &["46"],
    },
];

/// Pick the covered city for an address and/or ZIP code.
pub fn detect_city(address: &str, zip_code: &str) -> City {
    let address = address.to_lowercase();
    let zip = zip_code.trim();

    CITY_RULES
        .iter()
        .find(|rule| rule.matches(&address, zip))
        .map(|rule| rule.city)
        .unwrap_or(City::Columbus)
}

/// Static listing entry; expanded into a `Provider` on lookup.
struct Listing {
    id: &'static str,
    name: &'static str,
    service_type: ServiceType,
    phone: &'static str,
    website: &'static str,
    description: &'static str,
    price_range: &'static str,
    connection_time: &'static str,
    service_area: &'static str,
    rating: f64,
}

impl Listing {
    fn to_provider(&self, zip_code: &str) -> Provider {
        Provider {
            id: self.id.to_string(),
            name: self.name.to_string(),
            service_type: self.service_type,
            phone: Some(self.phone.to_string()),
            website: Some(self.website.to_string()),
            description: self.description.to_string(),
            service_areas: vec![zip_code.to_string()],
            rating: self.rating,
            // Listings carry only a 0-5 rating; scale it onto the 0-100 score.
            overall_score: (self.rating * 20.0).round(),
            popularity_score: 0.0,
            coverage_score: 0.0,
            price_score: 0.0,
            cellular_network: None,
            cellular_plans: None,
            requires_internet_subscription: None,
            bundle_options: None,
            price_range: Some(self.price_range.to_string()),
            connection_time: Some(self.connection_time.to_string()),
            service_area: Some(self.service_area.to_string()),
        }
    }
}

const DETROIT: &[Listing] = &[
    Listing {
        id: "dte-detroit",
        name: "DTE Energy",
        service_type: ServiceType::Electricity,
        phone: "1-800-477-4747",
        website: "https://www.dteenergy.com",
        description: "Primary electric utility serving southeastern Michigan with smart grid technology and renewable energy options.",
        price_range: "$90-135/month",
        connection_time: "2-3 business days",
        service_area: "Detroit Metro Area",
        rating: 4.2,
    },
    Listing {
        id: "xfinity-detroit",
        name: "Xfinity",
        service_type: ServiceType::Internet,
        phone: "1-800-934-6489",
        website: "https://www.xfinity.com",
        description: "High-speed cable internet up to 1200 Mbps. Widely available across Metro Detroit with reliable service.",
        price_range: "$55-95/month",
        connection_time: "7-10 business days",
        service_area: "Detroit and Suburbs",
        rating: 3.8,
    },
    Listing {
        id: "wm-detroit",
        name: "Waste Management",
        service_type: ServiceType::Waste,
        phone: "1-800-963-4776",
        website: "https://www.wm.com",
        description: "Weekly trash and recycling pickup with reliable scheduling. Serves most Detroit metro communities.",
        price_range: "$28-38/month",
        connection_time: "Next service day",
        service_area: "Metro Detroit",
        rating: 4.1,
    },
];

const COLUMBUS: &[Listing] = &[
    Listing {
        id: "aep-columbus",
        name: "AEP Ohio",
        service_type: ServiceType::Electricity,
        phone: "1-800-672-2231",
        website: "https://www.aepohio.com",
        description: "Primary electric utility for central Ohio with competitive rates and reliable service. Multiple rate plan options.",
        price_range: "$75-110/month",
        connection_time: "1-3 business days",
        service_area: "Central Ohio",
        rating: 4.0,
    },
    Listing {
        id: "spectrum-columbus",
        name: "Spectrum",
        service_type: ServiceType::Internet,
        phone: "1-855-707-7328",
        website: "https://www.spectrum.com",
        description: "Cable internet with no data caps and speeds up to 1000 Mbps. Excellent coverage in Columbus metro area.",
        price_range: "$45-85/month",
        connection_time: "5-7 business days",
        service_area: "Columbus Metro",
        rating: 3.7,
    },
    Listing {
        id: "rumpke-columbus",
        name: "Rumpke",
        service_type: ServiceType::Waste,
        phone: "1-800-828-8171",
        website: "https://www.rumpke.com",
        description: "Regional waste and recycling services. Local Ohio company with personalized service for over 85 years.",
        price_range: "$22-32/month",
        connection_time: "Next pickup day",
        service_area: "Columbus and Franklin County",
        rating: 4.2,
    },
];

const INDIANAPOLIS: &[Listing] = &[
    Listing {
        id: "ipl-indianapolis",
        name: "Indianapolis Power & Light",
        service_type: ServiceType::Electricity,
        phone: "1-317-261-8222",
        website: "https://www.indianapolispowerandlight.com",
        description: "Primary electric utility serving Indianapolis and surrounding counties with reliable power delivery.",
        price_range: "$78-108/month",
        connection_time: "2-4 business days",
        service_area: "Indianapolis Metro",
        rating: 4.1,
    },
    Listing {
        id: "xfinity-indianapolis",
        name: "Xfinity",
        service_type: ServiceType::Internet,
        phone: "1-800-934-6489",
        website: "https://www.xfinity.com",
        description: "Cable internet with speeds up to 1200 Mbps and extensive coverage across Indianapolis metropolitan area.",
        price_range: "$55-95/month",
        connection_time: "7-10 business days",
        service_area: "Indianapolis and Suburbs",
        rating: 3.8,
    },
    Listing {
        id: "republic-indianapolis",
        name: "Republic Services",
        service_type: ServiceType::Waste,
        phone: "1-800-299-4898",
        website: "https://www.republicservices.com",
        description: "Weekly trash and recycling pickup serving Indianapolis metro area with reliable scheduling.",
        price_range: "$28-38/month",
        connection_time: "Next service day",
        service_area: "Indianapolis Metro",
        rating: 4.0,
    },
];

const ANN_ARBOR: &[Listing] = &[
    Listing {
        id: "dte-annarbor",
        name: "DTE Energy",
        service_type: ServiceType::Electricity,
        phone: "1-800-477-4747",
        website: "https://www.dteenergy.com",
        description: "Reliable electric service for Ann Arbor and surrounding Washtenaw County with green energy options.",
        price_range: "$88-130/month",
        connection_time: "2-3 business days",
        service_area: "Ann Arbor and Washtenaw County",
        rating: 4.2,
    },
    Listing {
        id: "xfinity-annarbor",
        name: "Xfinity",
        service_type: ServiceType::Internet,
        phone: "1-800-934-6489",
        website: "https://www.xfinity.com",
        description: "High-speed cable internet with excellent coverage throughout Ann Arbor. Great for students and professionals.",
        price_range: "$55-90/month",
        connection_time: "5-7 business days",
        service_area: "Ann Arbor City",
        rating: 3.9,
    },
    Listing {
        id: "recycle-annarbor",
        name: "Recycle Ann Arbor",
        service_type: ServiceType::Waste,
        phone: "1-734-971-7400",
        website: "https://www.recycleannarbor.org",
        description: "Local waste and recycling service with environmental focus and excellent customer service.",
        price_range: "$30-40/month",
        connection_time: "Next service day",
        service_area: "Ann Arbor City",
        rating: 4.5,
    },
];

const TOLEDO: &[Listing] = &[
    Listing {
        id: "firstenergy-toledo",
        name: "Toledo Edison (FirstEnergy)",
        service_type: ServiceType::Electricity,
        phone: "1-888-544-4877",
        website: "https://www.firstenergy.com",
        description: "Electric utility serving Toledo and northwestern Ohio region with multiple rate plan options.",
        price_range: "$78-110/month",
        connection_time: "3-5 business days",
        service_area: "Toledo and Lucas County",
        rating: 3.9,
    },
    Listing {
        id: "buckeye-toledo",
        name: "Buckeye Broadband",
        service_type: ServiceType::Internet,
        phone: "1-419-724-9800",
        website: "https://www.buckeyebroadband.com",
        description: "Local cable and internet provider with fast speeds and excellent local customer service in Toledo area.",
        price_range: "$45-80/month",
        connection_time: "3-5 business days",
        service_area: "Toledo Metro",
        rating: 4.3,
    },
    Listing {
        id: "republic-toledo",
        name: "Republic Services",
        service_type: ServiceType::Waste,
        phone: "1-800-299-4898",
        website: "https://www.republicservices.com",
        description: "Comprehensive waste management services throughout Lucas County with reliable pickup schedules.",
        price_range: "$28-38/month",
        connection_time: "Next service day",
        service_area: "Toledo and Lucas County",
        rating: 4.0,
    },
];

fn listings(city: City) -> &'static [Listing] {
    match city {
        City::Detroit => DETROIT,
        City::Columbus => COLUMBUS,
        City::Indianapolis => INDIANAPOLIS,
        City::AnnArbor => ANN_ARBOR,
        City::Toledo => TOLEDO,
    }
}

/// Providers listed for a city, best overall score first.
pub fn providers_for_city(city: City, zip_code: &str) -> Vec<Provider> {
    let mut providers: Vec<Provider> = listings(city)
        .iter()
        .map(|listing| listing.to_provider(zip_code))
        .collect();
    providers.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
    providers
}

/// In-memory source over the launch-city listings. Offers no bundles.
#[derive(Debug, Clone, Default)]
pub struct DirectorySource;

#[async_trait]
impl ProviderSource for DirectorySource {
    fn name(&self) -> &'static str {
        "directory"
    }

    async fn providers_for_zip(&self, zip_code: &str) -> Result<Vec<Provider>, AppError> {
        let city = detect_city("", zip_code);
        tracing::debug!("ZIP {} resolved to {}", zip_code, city.display_name());
        Ok(providers_for_city(city, zip_code))
    }

    async fn bundles_for_zip(&self, _zip_code: &str) -> Result<Vec<Bundle>, AppError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_city_by_zip() {
        assert_eq!(detect_city("", "48201"), City::Detroit);
        assert_eq!(detect_city("", "48104"), City::AnnArbor);
        assert_eq!(detect_city("", "43604"), City::Toledo);
        assert_eq!(detect_city("", "43215"), City::Columbus);
        assert_eq!(detect_city("", "46204"), City::Indianapolis);
    }

    #[test]
    fn test_detect_city_by_address() {
        assert_eq!(detect_city("500 Woodward Ave, Detroit", ""), City::Detroit);
        assert_eq!(detect_city("State St, Ann Arbor, MI", ""), City::AnnArbor);
        assert_eq!(detect_city("downtown Indy", ""), City::Indianapolis);
    }

    #[test]
    fn test_unknown_area_defaults_to_columbus() {
        assert_eq!(detect_city("Somewhere, TX", "75001"), City::Columbus);
    }

    #[test]
    fn test_every_city_has_each_core_service() {
        for city in City::ALL {
            let providers = providers_for_city(city, "00000");
            for service in [ServiceType::Electricity, ServiceType::Internet, ServiceType::Waste] {
                assert!(
                    providers.iter().any(|p| p.service_type == service),
                    "{} has no {} provider",
                    city.slug(),
                    service
                );
            }
        }
    }

    #[tokio::test]
    async fn test_source_sorted_by_overall_score() {
        let providers = DirectorySource.providers_for_zip("43604").await.unwrap();
        assert_eq!(providers[0].name, "Buckeye Broadband");
        assert!(providers
            .windows(2)
            .all(|w| w[0].overall_score >= w[1].overall_score));
        assert_eq!(providers[0].service_areas, vec!["43604".to_string()]);
    }
}
