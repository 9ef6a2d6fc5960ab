//! Connection settings for the hosted PostgREST endpoints.

use std::time::Duration;

/// Default user agent for backend requests.
pub const DEFAULT_USER_AGENT: &str = "trashmap/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default timeout for the connectivity probe in seconds.
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 3;

/// Configuration shared by every HTTP adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `"https://xyz.supabase.co"`.
    pub base_url: String,
    /// Anonymous API key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Timeout for data requests.
    pub timeout: Duration,
    /// Timeout for the connectivity probe.
    pub probe_timeout: Duration,
    pub user_agent: String,
}

impl SupabaseConfig {
    /// Create a configuration with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            probe_timeout: Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connectivity probe timeout.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL of a REST resource below `/rest/v1/`.
    pub fn rest_url(&self, resource: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            resource.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("https://db.example.org", "rpc/listar_pontos_mapa")]
    #[case("https://db.example.org/", "/rpc/listar_pontos_mapa")]
    fn rest_urls_join_cleanly(#[case] base: &str, #[case] resource: &str) {
        let config = SupabaseConfig::new(base, "anon");
        assert_eq!(
            config.rest_url(resource),
            "https://db.example.org/rest/v1/rpc/listar_pontos_mapa"
        );
    }

    #[rstest]
    fn builder_overrides_defaults() {
        let config = SupabaseConfig::new("https://db.example.org", "anon")
            .with_timeout(Duration::from_secs(60))
            .with_probe_timeout(Duration::from_secs(1))
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.probe_timeout, Duration::from_secs(1));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }
}
