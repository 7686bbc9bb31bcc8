//! Harness configuration: base URL, credentials fixture, timeouts,
//! viewports, and test data.
//!
//! Defaults match the storefront demo fixture; everything can be
//! overridden from a YAML file. The credentials fixture is consumed
//! read-only by the page abstractions.

use crate::command::{RetryPolicy, DEFAULT_POLL_INTERVAL_MS};
use crate::result::{ComprarError, ComprarResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Named login identities from the fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    /// Normal, fully working user
    Standard,
    /// User whose login is rejected with a lockout error
    LockedOut,
    /// User who sees broken product data
    Problem,
    /// User whose pages render slowly
    PerformanceGlitch,
    /// User who triggers client-side errors
    Error,
    /// User with visual-regression quirks
    Visual,
}

impl UserRole {
    /// All roles in fixture order
    pub const ALL: [Self; 6] = [
        Self::Standard,
        Self::LockedOut,
        Self::Problem,
        Self::PerformanceGlitch,
        Self::Error,
        Self::Visual,
    ];

    /// Fixture key for this role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::LockedOut => "locked-out",
            Self::Problem => "problem",
            Self::PerformanceGlitch => "performance-glitch",
            Self::Error => "error",
            Self::Visual => "visual",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role → username mapping, all sharing one password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserFixture {
    /// Standard user login
    pub standard: String,
    /// Locked-out user login
    pub locked_out: String,
    /// Problem user login
    pub problem: String,
    /// Performance-glitch user login
    pub performance_glitch: String,
    /// Error user login
    pub error: String,
    /// Visual user login
    pub visual: String,
}

impl Default for UserFixture {
    fn default() -> Self {
        Self {
            standard: "standard_user".to_string(),
            locked_out: "locked_out_user".to_string(),
            problem: "problem_user".to_string(),
            performance_glitch: "performance_glitch_user".to_string(),
            error: "error_user".to_string(),
            visual: "visual_user".to_string(),
        }
    }
}

impl UserFixture {
    /// Username for a named identity
    #[must_use]
    pub fn username_for(&self, role: UserRole) -> &str {
        match role {
            UserRole::Standard => &self.standard,
            UserRole::LockedOut => &self.locked_out,
            UserRole::Problem => &self.problem,
            UserRole::PerformanceGlitch => &self.performance_glitch,
            UserRole::Error => &self.error,
            UserRole::Visual => &self.visual,
        }
    }
}

/// Timeout configuration in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Default observation timeout
    pub default_ms: u64,
    /// Page-load path timeout
    pub page_load_ms: u64,
    /// Polling interval between re-resolutions
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default_ms: 10_000,
            page_load_ms: 30_000,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

/// A viewport size for responsive checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Viewport presets for responsive checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewports {
    /// Phone-sized viewport
    pub mobile: Viewport,
    /// Tablet-sized viewport
    pub tablet: Viewport,
    /// Desktop viewport
    pub desktop: Viewport,
    /// Large desktop viewport
    pub large_desktop: Viewport,
}

impl Default for Viewports {
    fn default() -> Self {
        Self {
            mobile: Viewport {
                width: 375,
                height: 667,
            },
            tablet: Viewport {
                width: 768,
                height: 1024,
            },
            desktop: Viewport {
                width: 1280,
                height: 720,
            },
            large_desktop: Viewport {
                width: 1920,
                height: 1080,
            },
        }
    }
}

/// Customer test data for the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Customer {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Postal code
    pub postal_code: String,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            postal_code: "12345".to_string(),
        }
    }
}

impl Customer {
    /// Create customer data
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            postal_code: postal_code.into(),
        }
    }
}

/// Product names from the demo catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductCatalog {
    /// Sauce Labs Backpack
    pub backpack: String,
    /// Sauce Labs Bike Light
    pub bike_light: String,
    /// Sauce Labs Bolt T-Shirt
    pub bolt_t_shirt: String,
    /// Sauce Labs Fleece Jacket
    pub fleece_jacket: String,
    /// Sauce Labs Onesie
    pub onesie: String,
    /// Test.allTheThings() T-Shirt (Red)
    pub red_t_shirt: String,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            backpack: "Sauce Labs Backpack".to_string(),
            bike_light: "Sauce Labs Bike Light".to_string(),
            bolt_t_shirt: "Sauce Labs Bolt T-Shirt".to_string(),
            fleece_jacket: "Sauce Labs Fleece Jacket".to_string(),
            onesie: "Sauce Labs Onesie".to_string(),
            red_t_shirt: "Test.allTheThings() T-Shirt (Red)".to_string(),
        }
    }
}

impl ProductCatalog {
    /// All product names in fixture order
    #[must_use]
    pub fn all(&self) -> [&str; 6] {
        [
            &self.backpack,
            &self.bike_light,
            &self.bolt_t_shirt,
            &self.fleece_jacket,
            &self.onesie,
            &self.red_t_shirt,
        ]
    }
}

/// Top-level harness configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the application under test
    pub base_url: BaseUrl,
    /// Shared password for all fixture users
    pub password: Password,
    /// Named login identities
    pub users: UserFixture,
    /// Timeout configuration
    pub timeouts: Timeouts,
    /// Viewport presets
    pub viewports: Viewports,
    /// Customer test data
    pub customer: Customer,
    /// Product catalog
    pub products: ProductCatalog,
}

/// Base URL newtype so the default carries the fixture value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseUrl(pub String);

impl Default for BaseUrl {
    fn default() -> Self {
        Self("https://www.saucedemo.com".to_string())
    }
}

/// Shared fixture password newtype.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(pub String);

impl Default for Password {
    fn default() -> Self {
        Self("secret_sauce".to_string())
    }
}

impl HarnessConfig {
    /// Parse a configuration from YAML; absent keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is malformed.
    pub fn from_yaml_str(yaml: &str) -> ComprarResult<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| ComprarError::Assertion {
            message: format!("invalid harness config: {e}"),
        })
    }

    /// Load a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ComprarResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Absolute URL for a path under the base URL
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.0)
    }

    /// Username for a named identity
    #[must_use]
    pub fn username_for(&self, role: UserRole) -> &str {
        self.users.username_for(role)
    }

    /// Retry policy for ordinary observations
    #[must_use]
    pub fn default_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.timeouts.default_ms, self.timeouts.poll_interval_ms)
    }

    /// Retry policy for the page-load path
    #[must_use]
    pub fn page_load_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.timeouts.page_load_ms, self.timeouts.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_default_credentials() {
            let config = HarnessConfig::default();
            assert_eq!(config.username_for(UserRole::Standard), "standard_user");
            assert_eq!(config.username_for(UserRole::LockedOut), "locked_out_user");
            assert_eq!(
                config.username_for(UserRole::PerformanceGlitch),
                "performance_glitch_user"
            );
            assert_eq!(config.password.0, "secret_sauce");
        }

        #[test]
        fn test_default_timeouts() {
            let t = Timeouts::default();
            assert_eq!(t.default_ms, 10_000);
            assert_eq!(t.page_load_ms, 30_000);
        }

        #[test]
        fn test_default_customer() {
            let c = Customer::default();
            assert_eq!(c.first_name, "John");
            assert_eq!(c.last_name, "Doe");
            assert_eq!(c.postal_code, "12345");
        }

        #[test]
        fn test_catalog_has_six_products() {
            let products = ProductCatalog::default();
            assert_eq!(products.all().len(), 6);
            assert_eq!(products.backpack, "Sauce Labs Backpack");
        }

        #[test]
        fn test_url_for() {
            let config = HarnessConfig::default();
            assert_eq!(
                config.url_for("/inventory.html"),
                "https://www.saucedemo.com/inventory.html"
            );
        }

        #[test]
        fn test_policies_from_timeouts() {
            let config = HarnessConfig::default();
            assert_eq!(config.default_policy().timeout_ms, 10_000);
            assert_eq!(config.page_load_policy().timeout_ms, 30_000);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = HarnessConfig::from_yaml_str(
                "base_url: \"http://localhost:3000\"\ntimeouts:\n  default_ms: 2000\n",
            )
            .unwrap();
            assert_eq!(config.base_url.0, "http://localhost:3000");
            assert_eq!(config.timeouts.default_ms, 2000);
            // Untouched sections keep fixture defaults.
            assert_eq!(config.timeouts.page_load_ms, 30_000);
            assert_eq!(config.password.0, "secret_sauce");
        }

        #[test]
        fn test_invalid_yaml_is_rejected() {
            assert!(HarnessConfig::from_yaml_str(": not yaml").is_err());
        }

        #[test]
        fn test_roundtrip() {
            let config = HarnessConfig::default();
            let yaml = serde_yaml_ng::to_string(&config).unwrap();
            let back = HarnessConfig::from_yaml_str(&yaml).unwrap();
            assert_eq!(back, config);
        }
    }

    mod role_tests {
        use super::*;

        #[test]
        fn test_role_names() {
            assert_eq!(UserRole::LockedOut.to_string(), "locked-out");
            assert_eq!(UserRole::ALL.len(), 6);
        }
    }
}
