use std::env;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_ROSTER_PATH: &str = "doctor_list.json";
pub const DEFAULT_APPOINTMENTS_TABLE: &str = "appointments";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub roster_path: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub appointments_table: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_temperature: f32,
    pub llm_timeout_seconds: u64,
    pub database_timeout_seconds: u64,
    pub max_sessions: usize,
    pub session_idle_minutes: u64,
    pub server_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roster_path: DEFAULT_ROSTER_PATH.to_string(),
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            appointments_table: DEFAULT_APPOINTMENTS_TABLE.to_string(),
            openai_api_key: String::new(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_temperature: 0.0,
            llm_timeout_seconds: 30,
            database_timeout_seconds: 10,
            max_sessions: 1000,
            session_idle_minutes: 60,
            server_port: 3000,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            roster_path: env::var("ROSTER_PATH")
                .unwrap_or_else(|_| {
                    warn!("ROSTER_PATH not set, using {}", DEFAULT_ROSTER_PATH);
                    defaults.roster_path.clone()
                }),
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            appointments_table: env::var("APPOINTMENTS_TABLE")
                .unwrap_or_else(|_| defaults.appointments_table.clone()),
            openai_api_key: env::var("OPENAI_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("OPENAI_API_KEY not set, using empty value");
                    String::new()
                }),
            openai_base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| defaults.openai_base_url.clone()),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| defaults.openai_model.clone()),
            openai_temperature: parse_or("OPENAI_TEMPERATURE", defaults.openai_temperature),
            llm_timeout_seconds: parse_or("LLM_TIMEOUT_SECONDS", defaults.llm_timeout_seconds),
            database_timeout_seconds: parse_or("DATABASE_TIMEOUT_SECONDS", defaults.database_timeout_seconds),
            max_sessions: parse_or("MAX_SESSIONS", defaults.max_sessions),
            session_idle_minutes: parse_or("SESSION_IDLE_MINUTES", defaults.session_idle_minutes),
            server_port: parse_or("SERVER_PORT", defaults.server_port),
        };

        if !config.is_configured() {
            warn!("Supabase not configured - appointments will be kept in memory");
        }
        if !config.is_llm_configured() {
            warn!("OpenAI API key missing - chat requests will fail");
        }

        config
    }

    /// True when the appointment ledger can be backed by Supabase.
    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_anon_key.is_empty()
    }

    pub fn is_llm_configured(&self) -> bool {
        !self.openai_api_key.is_empty() && !self.openai_base_url.is_empty()
    }
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_in_memory_ledger() {
        let config = AppConfig::default();
        assert!(!config.is_configured());
        assert!(!config.is_llm_configured());
        assert_eq!(config.roster_path, "doctor_list.json");
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.database_timeout_seconds, 10);
        assert_eq!(config.max_sessions, 1000);
    }

    #[test]
    fn supabase_requires_url_and_key() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            ..AppConfig::default()
        };
        assert!(!config.is_configured());

        let config = AppConfig {
            supabase_anon_key: "anon".to_string(),
            ..config
        };
        assert!(config.is_configured());
    }
}
