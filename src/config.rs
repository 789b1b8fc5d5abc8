use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub gateway_key_id: String,
    pub gateway_key_secret: String,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("gateway_key_id", &self.gateway_key_id)
            .field("gateway_key_secret", &"<redacted>")
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            gateway_key_id: env::var("GATEWAY_KEY_ID").unwrap_or_else(|_| "sandbox".to_string()),
            gateway_key_secret: env::var("GATEWAY_KEY_SECRET").unwrap_or_default(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
