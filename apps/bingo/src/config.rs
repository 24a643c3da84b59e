use std::sync::Arc;
use std::time::Duration;

use bingo_sdk::{
    BOARD_REFRESH_SEC_KEY, BackendEndpoint, BaseUrlResolver, BaseUrlStrategy, PreferenceStore,
    resolve_poll_interval,
};

/// Backend URL captured by `build.rs`; empty when none was set at compile time.
pub const BUILD_TIME_BASE_URL: &str = env!("BINGO_BUILD_API_BASE_URL");

pub const PUBLIC_URL_ENV: &str = "BINGO_PUBLIC_URL";
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:5173/";

/// The standard strategy list, preceded by an explicit command-line value when
/// one was given.
pub fn resolver(cli_override: Option<&str>, prefs: Arc<dyn PreferenceStore>) -> BaseUrlResolver {
    let standard = BaseUrlResolver::standard(BUILD_TIME_BASE_URL, prefs);
    match cli_override {
        Some(value) => {
            let mut strategies = vec![BaseUrlStrategy::Fixed {
                label: "flag:--api-base-url".into(),
                value: value.to_string(),
            }];
            strategies.extend(standard.into_strategies());
            BaseUrlResolver::new(strategies)
        }
        None => standard,
    }
}

/// Resolves the backend endpoint for this process. Later calls return the
/// first result.
pub fn resolve_base_url(
    cli_override: Option<&str>,
    prefs: Arc<dyn PreferenceStore>,
) -> &'static BackendEndpoint {
    BackendEndpoint::resolve_once(&resolver(cli_override, prefs))
}

pub fn poll_interval(explicit: Option<f64>, prefs: &dyn PreferenceStore) -> Duration {
    resolve_poll_interval(explicit, prefs.get(BOARD_REFRESH_SEC_KEY).as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bingo_sdk::{API_BASE_URL_KEY, MemoryPreferences};

    #[test]
    fn command_line_value_is_tried_first() {
        let prefs: Arc<dyn PreferenceStore> =
            Arc::new(MemoryPreferences::new().with(API_BASE_URL_KEY, "https://saved.example"));
        let resolver = resolver(Some("https://flag.example"), prefs);
        let labels: Vec<String> = resolver.strategies().iter().map(|s| s.label()).collect();
        assert_eq!(labels[0], "flag:--api-base-url");
        assert_eq!(labels.last().map(String::as_str), Some("preference:api_base_url"));
        assert_eq!(resolver.resolve().base_url(), "https://flag.example");
    }

    #[test]
    fn poll_interval_reads_refresh_preference() {
        let prefs = MemoryPreferences::new().with(BOARD_REFRESH_SEC_KEY, "5");
        assert_eq!(poll_interval(None, &prefs), Duration::from_secs(5));
        assert_eq!(poll_interval(Some(2.0), &prefs), Duration::from_secs(2));
        assert_eq!(poll_interval(None, &MemoryPreferences::new()), Duration::from_secs(3));
    }
}
