//! Backend base URL resolution.
//!
//! The base URL is resolved from an ordered list of strategies; the first one
//! yielding a non-empty value wins, otherwise the endpoint is unset. The order
//! of [`BaseUrlResolver::standard`] is the documented contract:
//!
//! 1. the value baked in at build time,
//! 2. `BINGO_API_BASE_URL`, then `SHEET_URL`, from the process environment,
//! 3. the persisted `api_base_url` preference.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::error::ClientError;
use crate::preferences::{PreferenceStore, API_BASE_URL_KEY};

pub const BASE_URL_ENV: &str = "BINGO_API_BASE_URL";
pub const LEGACY_BASE_URL_ENV: &str = "SHEET_URL";

pub enum BaseUrlStrategy {
    /// A value fixed when the binary was compiled. Empty means "not provided".
    BuildTime(&'static str),
    /// A process environment variable, read at resolution time.
    Env(String),
    /// The persisted user override.
    Preference(Arc<dyn PreferenceStore>),
    /// An explicit value, e.g. from a command-line flag.
    Fixed { label: String, value: String },
}

impl BaseUrlStrategy {
    pub fn label(&self) -> String {
        match self {
            BaseUrlStrategy::BuildTime(_) => "build-time".into(),
            BaseUrlStrategy::Env(name) => format!("env:{name}"),
            BaseUrlStrategy::Preference(_) => format!("preference:{API_BASE_URL_KEY}"),
            BaseUrlStrategy::Fixed { label, .. } => label.clone(),
        }
    }

    /// The trimmed candidate value, `None` when this strategy has nothing to offer.
    pub fn candidate(&self) -> Option<String> {
        let raw = match self {
            BaseUrlStrategy::BuildTime(value) => Some((*value).to_string()),
            BaseUrlStrategy::Env(name) => std::env::var(name).ok(),
            BaseUrlStrategy::Preference(store) => store.get(API_BASE_URL_KEY),
            BaseUrlStrategy::Fixed { value, .. } => Some(value.clone()),
        };
        raw.map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}

impl fmt::Debug for BaseUrlStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug)]
pub struct BaseUrlResolver {
    strategies: Vec<BaseUrlStrategy>,
}

impl BaseUrlResolver {
    pub fn new(strategies: Vec<BaseUrlStrategy>) -> Self {
        Self { strategies }
    }

    pub fn standard(build_time: &'static str, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self::new(vec![
            BaseUrlStrategy::BuildTime(build_time),
            BaseUrlStrategy::Env(BASE_URL_ENV.into()),
            BaseUrlStrategy::Env(LEGACY_BASE_URL_ENV.into()),
            BaseUrlStrategy::Preference(preferences),
        ])
    }

    pub fn strategies(&self) -> &[BaseUrlStrategy] {
        &self.strategies
    }

    pub fn into_strategies(self) -> Vec<BaseUrlStrategy> {
        self.strategies
    }

    pub fn resolve(&self) -> BackendEndpoint {
        for strategy in &self.strategies {
            if let Some(value) = strategy.candidate() {
                debug!(
                    target: "bingo::config",
                    source = %strategy.label(),
                    base_url = %value,
                    "resolved backend base url"
                );
                return BackendEndpoint {
                    base_url: value,
                    source: Some(strategy.label()),
                };
            }
        }
        debug!(target: "bingo::config", "backend base url is unset");
        BackendEndpoint::unset()
    }
}

/// A resolved, immutable backend base URL. Empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendEndpoint {
    base_url: String,
    source: Option<String>,
}

static PROCESS_ENDPOINT: OnceLock<BackendEndpoint> = OnceLock::new();

impl BackendEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().to_string();
        Self {
            source: (!base_url.is_empty()).then(|| "explicit".to_string()),
            base_url,
        }
    }

    pub fn unset() -> Self {
        Self::default()
    }

    /// Resolves once per process; later calls return the first result regardless
    /// of the resolver passed. Picking up a new configuration needs a restart.
    pub fn resolve_once(resolver: &BaseUrlResolver) -> &'static BackendEndpoint {
        PROCESS_ENDPOINT.get_or_init(|| resolver.resolve())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty()
    }

    pub fn ensure_configured(&self) -> Result<&str, ClientError> {
        if self.base_url.is_empty() {
            Err(ClientError::Config)
        } else {
            Ok(&self.base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::MemoryPreferences;

    fn prefs(value: Option<&str>) -> Arc<dyn PreferenceStore> {
        let store = MemoryPreferences::new();
        match value {
            Some(value) => Arc::new(store.with(API_BASE_URL_KEY, value)),
            None => Arc::new(store),
        }
    }

    #[test]
    fn build_time_value_wins_over_preference() {
        let resolver = BaseUrlResolver::new(vec![
            BaseUrlStrategy::BuildTime("https://built.example/exec"),
            BaseUrlStrategy::Preference(prefs(Some("https://saved.example/exec"))),
        ]);
        let endpoint = resolver.resolve();
        assert_eq!(endpoint.base_url(), "https://built.example/exec");
        assert_eq!(endpoint.source(), Some("build-time"));
    }

    #[test]
    fn falls_through_empty_and_blank_values() {
        let resolver = BaseUrlResolver::new(vec![
            BaseUrlStrategy::BuildTime(""),
            BaseUrlStrategy::Env("BINGO_TEST_ENDPOINT_NEVER_SET_9F2C".into()),
            BaseUrlStrategy::Preference(prefs(Some("   https://saved.example/exec  "))),
        ]);
        let endpoint = resolver.resolve();
        assert_eq!(endpoint.base_url(), "https://saved.example/exec");
        assert_eq!(endpoint.source(), Some("preference:api_base_url"));
    }

    #[test]
    fn environment_strategy_reads_named_variable() {
        let name = "BINGO_TEST_ENDPOINT_ENV_4A1D";
        std::env::set_var(name, "https://env.example/exec");
        let resolver = BaseUrlResolver::new(vec![
            BaseUrlStrategy::BuildTime(""),
            BaseUrlStrategy::Env(name.into()),
            BaseUrlStrategy::Preference(prefs(Some("https://saved.example/exec"))),
        ]);
        let endpoint = resolver.resolve();
        std::env::remove_var(name);
        assert_eq!(endpoint.base_url(), "https://env.example/exec");
        assert_eq!(endpoint.source(), Some("env:BINGO_TEST_ENDPOINT_ENV_4A1D"));
    }

    #[test]
    fn nothing_configured_yields_unset_endpoint() {
        let resolver = BaseUrlResolver::new(vec![
            BaseUrlStrategy::BuildTime(""),
            BaseUrlStrategy::Preference(prefs(None)),
        ]);
        let endpoint = resolver.resolve();
        assert!(!endpoint.is_configured());
        assert!(matches!(
            endpoint.ensure_configured(),
            Err(ClientError::Config)
        ));
    }

    #[test]
    fn standard_order_is_build_env_legacy_env_preference() {
        let resolver = BaseUrlResolver::standard("", prefs(None));
        let labels: Vec<String> = resolver.strategies().iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            [
                "build-time",
                "env:BINGO_API_BASE_URL",
                "env:SHEET_URL",
                "preference:api_base_url"
            ]
        );
    }

    #[test]
    fn process_endpoint_is_resolved_once() {
        let first = BaseUrlResolver::new(vec![BaseUrlStrategy::Fixed {
            label: "test".into(),
            value: "https://first.example".into(),
        }]);
        let second = BaseUrlResolver::new(vec![BaseUrlStrategy::Fixed {
            label: "test".into(),
            value: "https://second.example".into(),
        }]);
        let resolved = BackendEndpoint::resolve_once(&first);
        let again = BackendEndpoint::resolve_once(&second);
        assert_eq!(resolved.base_url(), "https://first.example");
        assert!(std::ptr::eq(resolved, again));
    }
}
