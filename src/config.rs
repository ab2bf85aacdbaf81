use std::env;
use std::path::PathBuf;
use std::time::Duration;
use log::warn;

// Server Configuration
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

// Token Configuration
pub const DEFAULT_APP_TOKEN: &str = "change-me";

// Mail Configuration
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

// Schedule Configuration
pub const DEFAULT_SCHEDULE_HOUR: u32 = 23;
pub const DEFAULT_SCHEDULE_MINUTE: u32 = 0;
pub const RECURRING_PERIOD_SECS: u64 = 24 * 60 * 60;

// Alpha Vantage free tier allows 5 requests per minute
pub const DEFAULT_REQUEST_DELAY_SECS: u64 = 60;
pub const HTTP_TIMEOUT_SECS: u64 = 30;

// Price change thresholds (percent)
pub const DAILY_CUTOFF: f64 = 5.0;
pub const WEEKLY_CUTOFF: f64 = 5.0;
pub const MONTHLY_CUTOFF: f64 = 10.0;

// Number of sessions requested from Stooq per fetch
pub const STOOQ_SESSIONS: u32 = 2;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub app_token: String,
    pub alpha_vantage_api_key: String,
    pub user_email: String,
    pub sender_email: String,
    pub sender_email_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub data_dir: PathBuf,
    pub quote_dump_dir: Option<PathBuf>,
    pub schedule_hour: u32,
    pub schedule_minute: u32,
    pub request_delay_secs: u64,
    pub log_level: String,
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has an invalid value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_address: env::var("BIND_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string()),
            app_token: env::var("APP_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("APP_TOKEN not set, using default (NOT for production!)");
                    DEFAULT_APP_TOKEN.to_string()
                }),
            alpha_vantage_api_key: env::var("ALPHA_VANTAGE_API_KEY").unwrap_or_default(),
            user_email: env::var("USER_EMAIL").unwrap_or_default(),
            sender_email: env::var("SENDER_EMAIL").unwrap_or_default(),
            sender_email_password: env::var("SENDER_EMAIL_PASSWORD").unwrap_or_default(),
            smtp_host: env::var("SMTP_HOST")
                .unwrap_or_else(|_| DEFAULT_SMTP_HOST.to_string()),
            smtp_port: parse_env("SMTP_PORT", DEFAULT_SMTP_PORT),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            quote_dump_dir: env::var("QUOTE_DUMP_DIR").ok().map(PathBuf::from),
            schedule_hour: parse_env("SCHEDULE_HOUR", DEFAULT_SCHEDULE_HOUR),
            schedule_minute: parse_env("SCHEDULE_MINUTE", DEFAULT_SCHEDULE_MINUTE),
            request_delay_secs: parse_env("REQUEST_DELAY_SECS", DEFAULT_REQUEST_DELAY_SECS),
            log_level: env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.app_token.trim().is_empty() {
            return Err("APP_TOKEN must not be empty".to_string());
        }

        if self.app_token == DEFAULT_APP_TOKEN {
            warn!("Using default app token - change for production!");
        }

        if self.alpha_vantage_api_key.is_empty() {
            warn!("ALPHA_VANTAGE_API_KEY not set, global quotes will fail");
        }

        if self.schedule_hour >= 24 {
            return Err(format!("SCHEDULE_HOUR must be below 24, got {}", self.schedule_hour));
        }

        if self.schedule_minute >= 60 {
            return Err(format!("SCHEDULE_MINUTE must be below 60, got {}", self.schedule_minute));
        }

        Ok(())
    }

    pub fn log_config(&self) {
        println!("Server Configuration:");
        println!("  Bind Address: {}", self.bind_address);
        println!("  Data Dir: {}", self.data_dir.display());
        println!("  SMTP: {}:{}", self.smtp_host, self.smtp_port);
        println!("  Mail: {} -> {}", self.sender_email, self.user_email);
        println!("  Schedule: {:02}:{:02} daily", self.schedule_hour, self.schedule_minute);
        println!("  Request Delay: {}s", self.request_delay_secs);
        println!("  Log Level: {}", self.log_level);
        println!("  App Token: {}***", self.app_token.chars().take(4).collect::<String>());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            app_token: "a-real-token".to_string(),
            alpha_vantage_api_key: "demo".to_string(),
            user_email: "user@example.com".to_string(),
            sender_email: "sender@example.com".to_string(),
            sender_email_password: "secret".to_string(),
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
            smtp_port: DEFAULT_SMTP_PORT,
            data_dir: PathBuf::from("."),
            quote_dump_dir: None,
            schedule_hour: DEFAULT_SCHEDULE_HOUR,
            schedule_minute: DEFAULT_SCHEDULE_MINUTE,
            request_delay_secs: DEFAULT_REQUEST_DELAY_SECS,
            log_level: "info".to_string(),
        }
    }

    #[test]
    fn test_config_from_env() {
        let config = Config::from_env();
        assert!(!config.bind_address.is_empty());
        assert!(!config.app_token.is_empty());
        assert!(!config.smtp_host.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = sample_config();
        assert!(config.validate().is_ok());

        config.app_token = "   ".to_string();
        assert!(config.validate().is_err());

        config.app_token = "a-real-token".to_string();
        config.schedule_hour = 24;
        assert!(config.validate().is_err());

        config.schedule_hour = 23;
        config.schedule_minute = 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_falls_back_on_invalid_value() {
        env::set_var("TICKER_MONITOR_TEST_PORT", "not-a-port");
        assert_eq!(parse_env("TICKER_MONITOR_TEST_PORT", 465u16), 465);

        env::set_var("TICKER_MONITOR_TEST_PORT", " 2525 ");
        assert_eq!(parse_env("TICKER_MONITOR_TEST_PORT", 465u16), 2525);

        env::remove_var("TICKER_MONITOR_TEST_PORT");
        assert_eq!(parse_env("TICKER_MONITOR_TEST_PORT", 465u16), 465);
    }

    #[test]
    fn test_request_delay() {
        let mut config = sample_config();
        config.request_delay_secs = 12;
        assert_eq!(config.request_delay(), Duration::from_secs(12));
    }
}
