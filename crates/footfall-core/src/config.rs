use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub store_token: String,
    pub geo_url: String,
    pub heartbeat_seconds: u64,
    pub presence_ttl_seconds: u64,
    pub top_countries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let cfg = Self {
            store_url: std::env::var("FOOTFALL_STORE_URL")
                .map_err(|_| "FOOTFALL_STORE_URL is required".to_string())?,
            store_token: std::env::var("FOOTFALL_STORE_TOKEN")
                .map_err(|_| "FOOTFALL_STORE_TOKEN is required".to_string())?,
            geo_url: std::env::var("FOOTFALL_GEO_URL")
                .unwrap_or_else(|_| "https://ipapi.co/json/".to_string()),
            heartbeat_seconds: std::env::var("FOOTFALL_HEARTBEAT_SECONDS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|e| format!("invalid heartbeat seconds: {e}"))?,
            presence_ttl_seconds: std::env::var("FOOTFALL_PRESENCE_TTL_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|e| format!("invalid presence ttl seconds: {e}"))?,
            top_countries: std::env::var("FOOTFALL_TOP_COUNTRIES")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// The marker must outlive one missed heartbeat, so the TTL has to
    /// exceed the cadence.
    pub fn validate(&self) -> Result<(), String> {
        if self.presence_ttl_seconds <= self.heartbeat_seconds {
            return Err(format!(
                "presence ttl ({}s) must exceed heartbeat cadence ({}s)",
                self.presence_ttl_seconds, self.heartbeat_seconds
            ));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_seconds)
    }

    pub fn presence_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            store_url: "https://store.example".to_string(),
            store_token: "token".to_string(),
            geo_url: "https://ipapi.co/json/".to_string(),
            heartbeat_seconds: 20,
            presence_ttl_seconds: 30,
            top_countries: 3,
        }
    }

    #[test]
    fn reference_cadence_is_valid() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn ttl_not_exceeding_cadence_is_rejected() {
        let mut cfg = base_config();
        cfg.presence_ttl_seconds = 20;
        assert!(cfg.validate().is_err());
        cfg.presence_ttl_seconds = 10;
        assert!(cfg.validate().is_err());
    }
}
