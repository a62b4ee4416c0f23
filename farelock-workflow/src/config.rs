use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowConfig {
    pub authority: AuthorityConfig,
    #[serde(default = "default_tick_ms")]
    pub countdown_tick_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthorityConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl WorkflowConfig {
    /// Countdown tick interval for `CountdownClock::start`.
    pub fn tick(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.countdown_tick_ms)
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Environment-specific file is optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // E.g. FARELOCK__AUTHORITY__BASE_URL
            .add_source(config::Environment::with_prefix("FARELOCK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config: WorkflowConfig = serde_json::from_value(serde_json::json!({
            "authority": { "base_url": "https://api.example.test" }
        }))
        .unwrap();
        assert_eq!(config.countdown_tick_ms, 1000);
        assert_eq!(config.tick(), std::time::Duration::from_secs(1));
        assert_eq!(config.authority.request_timeout_ms, 10_000);
    }
}
