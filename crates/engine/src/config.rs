//! Engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OPTIONSET_PRICING_URL` - Base URL of the pricing/discount service
//!
//! ## Optional
//! - `OPTIONSET_CART_URL` - Base URL of the cart service
//! - `OPTIONSET_WAITLIST_URL` - Base URL of the waitlist service
//! - `OPTIONSET_SERVICE_TOKEN` - Bearer token for all three services (min 16 chars, high entropy)
//! - `OPTIONSET_DISCOUNT_DEBOUNCE_MS` - Quiet period before a discount fetch (default: 150)
//! - `OPTIONSET_DISCOUNT_CACHE_TTL_SECS` - Discount cache TTL (default: 300)
//! - `OPTIONSET_DISCOUNT_CACHE_CAPACITY` - Discount cache entries (default: 1000)
//! - `OPTIONSET_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SERVICE_TOKEN_LENGTH: usize = 16;
const DEFAULT_DEBOUNCE_MS: u64 = 150;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_CAPACITY: u64 = 1000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Fragments that mark a token as copied from a template or docs.
const PLACEHOLDER_FRAGMENTS: &[&str] = &[
    "changeme",
    "placeholder",
    "example",
    "sample",
    "dummy",
    "your-",
    "token-here",
    "xxxx",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Discount lookup tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountSettings {
    /// Quiet period before a request is sent.
    pub debounce: Duration,
    /// How long a cached response stays valid.
    pub cache_ttl: Duration,
    /// Maximum cached keys.
    pub cache_capacity: u64,
}

impl Default for DiscountSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Engine configuration.
///
/// Implements `Debug` manually to redact the service token.
#[derive(Clone)]
pub struct EngineConfig {
    /// Pricing/discount service base URL
    pub pricing_url: Url,
    /// Cart service base URL
    pub cart_url: Option<Url>,
    /// Waitlist service base URL
    pub waitlist_url: Option<Url>,
    /// Bearer token sent to every service
    pub service_token: Option<SecretString>,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
    /// Discount fetcher settings
    pub discounts: DiscountSettings,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("pricing_url", &self.pricing_url.as_str())
            .field("cart_url", &self.cart_url.as_ref().map(Url::as_str))
            .field("waitlist_url", &self.waitlist_url.as_ref().map(Url::as_str))
            .field(
                "service_token",
                &self.service_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("http_timeout", &self.http_timeout)
            .field("discounts", &self.discounts)
            .finish()
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service token fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`EngineConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let pricing_url = parse_url("OPTIONSET_PRICING_URL", &env.required("OPTIONSET_PRICING_URL")?)?;
        let cart_url = env
            .optional("OPTIONSET_CART_URL")
            .map(|v| parse_url("OPTIONSET_CART_URL", &v))
            .transpose()?;
        let waitlist_url = env
            .optional("OPTIONSET_WAITLIST_URL")
            .map(|v| parse_url("OPTIONSET_WAITLIST_URL", &v))
            .transpose()?;

        let service_token = env
            .optional("OPTIONSET_SERVICE_TOKEN")
            .map(|token| {
                check_service_token("OPTIONSET_SERVICE_TOKEN", &token)?;
                Ok::<_, ConfigError>(SecretString::from(token))
            })
            .transpose()?;

        let discounts = DiscountSettings {
            debounce: Duration::from_millis(
                env.parsed_or("OPTIONSET_DISCOUNT_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?,
            ),
            cache_ttl: Duration::from_secs(
                env.parsed_or("OPTIONSET_DISCOUNT_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?,
            ),
            cache_capacity: env
                .parsed_or("OPTIONSET_DISCOUNT_CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY)?,
        };
        let http_timeout = Duration::from_secs(
            env.parsed_or("OPTIONSET_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        );

        Ok(Self {
            pricing_url,
            cart_url,
            waitlist_url,
            service_token,
            http_timeout,
            discounts,
        })
    }

    /// The service token, if configured.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.service_token.as_ref().map(|t| t.expose_secret())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Key lookup with the usual required/optional/default helpers.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |v| {
            v.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Reject a service token that could not have come from a secret generator.
fn check_service_token(key: &str, token: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| Err(ConfigError::InsecureSecret(key.to_string(), reason));

    let chars = token.chars().count();
    if chars < MIN_SERVICE_TOKEN_LENGTH {
        return insecure(format!(
            "needs at least {MIN_SERVICE_TOKEN_LENGTH} characters, got {chars}"
        ));
    }

    let lower = token.to_ascii_lowercase();
    if let Some(fragment) = PLACEHOLDER_FRAGMENTS.iter().find(|f| lower.contains(**f)) {
        return insecure(format!("looks like a template value (contains '{fragment}')"));
    }

    let bits = entropy_bits_per_char(token);
    if bits < MIN_ENTROPY_BITS_PER_CHAR {
        return insecure(format!(
            "{bits:.2} bits/char of entropy, need {MIN_ENTROPY_BITS_PER_CHAR}; generate it randomly"
        ));
    }
    Ok(())
}

/// Shannon entropy of the character distribution, in bits per character.
fn entropy_bits_per_char(s: &str) -> f64 {
    let mut counts = BTreeMap::<char, u32>::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }

    let total = f64::from(counts.values().sum::<u32>());
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}
