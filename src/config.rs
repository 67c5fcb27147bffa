use chrono_tz::Tz;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database_url: Option<String>,
    pub base_url: Option<String>,
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_hash_salt_rounds")]
    pub hash_salt_rounds: u32,
    #[serde(default)]
    pub sync_db: bool,
    pub app_env: Option<String>,
    pub timezone: Option<String>,
    pub max_body_bytes: Option<usize>,

    pub smtp_host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub smtp_login: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_email: Option<String>,

    #[serde(default = "default_sms_api_url")]
    pub sms_api_url: String,
    pub sms_username: Option<String>,
    pub sms_password: Option<String>,
    #[serde(default)]
    pub sms_did: String,

    #[serde(default = "default_llm_api_url")]
    pub llm_api_url: String,
    pub llm_api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    #[serde(default = "default_agent_reply_delay_secs")]
    pub agent_reply_delay_secs: u64,

    #[serde(default = "default_company_name")]
    pub company_name: String,
    #[serde(default = "default_website_url")]
    pub website_url: String,

    pub git_sha: Option<String>,
    pub git_sha_ts: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4005
}

fn default_hash_salt_rounds() -> u32 {
    10
}

fn default_smtp_port() -> u16 {
    465
}

fn default_sms_api_url() -> String {
    "https://voip.ms/api/v1/rest.php".to_string()
}

fn default_llm_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_agent_reply_delay_secs() -> u64 {
    60
}

fn default_company_name() -> String {
    "BU Mobile Detailing".to_string()
}

fn default_website_url() -> String {
    "https://www.bumobiledetailing.com".to_string()
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let mut config: Config = cfg.try_deserialize()?;

        if config.timezone.is_none() {
            config.timezone = Some("America/New_York".to_string());
        }

        config.validate()?;

        Ok(config)
    }

    pub fn get_timezone(&self) -> Result<Tz, chrono_tz::ParseError> {
        let tz_str = self.timezone.as_deref().unwrap_or("America/New_York");
        tz_str.parse::<Tz>()
    }

    /// Timezone used for calendar math; falls back to UTC on a bad value.
    pub fn business_timezone(&self) -> Tz {
        self.get_timezone().unwrap_or(Tz::UTC)
    }

    pub fn is_dev(&self) -> bool {
        self.app_env
            .as_deref()
            .map(|env| env.eq_ignore_ascii_case("development"))
            .unwrap_or(false)
    }

    pub fn agent_reply_delay(&self) -> Duration {
        Duration::from_secs(self.agent_reply_delay_secs)
    }

    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(10 * 1024 * 1024)
    }

    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or("http://localhost:3000")
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher".to_string(),
            ));
        }

        if self.jwt_secret.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "JWT_SECRET must be set".to_string(),
            ));
        }

        // bcrypt accepts costs in 4..=31
        if !(4..=31).contains(&self.hash_salt_rounds) {
            return Err(config::ConfigError::Message(format!(
                "HASH_SALT_ROUNDS must be between 4 and 31, got {}",
                self.hash_salt_rounds
            )));
        }

        if let Some(tz_str) = &self.timezone {
            if tz_str.parse::<Tz>().is_err() {
                return Err(config::ConfigError::Message(format!(
                    "Invalid timezone: {}",
                    tz_str
                )));
            }
        }

        if let Some(limit) = self.max_body_bytes {
            let min = 64 * 1024;
            let max = 100 * 1024 * 1024;
            if limit < min || limit > max {
                return Err(config::ConfigError::Message(format!(
                    "max_body_bytes must be between {} and {} bytes",
                    min, max
                )));
            }
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            base_url: None,
            frontend_url: None,
            jwt_secret: String::new(),
            hash_salt_rounds: default_hash_salt_rounds(),
            sync_db: false,
            app_env: None,
            timezone: Some("America/New_York".to_string()),
            max_body_bytes: None,
            smtp_host: None,
            smtp_port: default_smtp_port(),
            smtp_login: None,
            smtp_password: None,
            smtp_email: None,
            sms_api_url: default_sms_api_url(),
            sms_username: None,
            sms_password: None,
            sms_did: String::new(),
            llm_api_url: default_llm_api_url(),
            llm_api_key: None,
            llm_model: default_llm_model(),
            agent_reply_delay_secs: default_agent_reply_delay_secs(),
            company_name: default_company_name(),
            website_url: default_website_url(),
            git_sha: None,
            git_sha_ts: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub sql_log: Option<bool>,
}

impl DatabaseSettings {
    pub fn default_from_url(url: String) -> Self {
        Self {
            url,
            max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS"),
            min_connections: parse_env_var("DATABASE_MIN_CONNECTIONS"),
            connect_timeout_secs: parse_env_var("DATABASE_CONNECT_TIMEOUT_SECS"),
            acquire_timeout_secs: parse_env_var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            idle_timeout_secs: parse_env_var("DATABASE_IDLE_TIMEOUT_SECS"),
            sql_log: parse_env_var("DATABASE_SQL_LOG"),
        }
    }
}

fn parse_env_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_mode_follows_app_env() {
        let mut config = Config::default();
        assert!(!config.is_dev());
        config.app_env = Some("Development".into());
        assert!(config.is_dev());
    }

    #[test]
    fn validation_rejects_missing_secret_and_bad_cost() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.jwt_secret = "secret".into();
        assert!(config.validate().is_ok());

        config.hash_salt_rounds = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_timezone_falls_back_to_utc() {
        let config = Config {
            timezone: Some("Mars/Olympus".into()),
            ..Config::default()
        };
        assert_eq!(config.business_timezone(), Tz::UTC);
    }
}
