use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use url::Url;

use crate::{error::AppError, models::itinerary::ItineraryFormat};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub llm: LlmConfig,
    pub storage: StorageConfig,
    pub map: MapConfig,
    pub public_api_base_url: String,
    pub speech_language: String,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub itinerary_format: ItineraryFormat,
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub database_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MapConfig {
    pub amap_key: Option<String>,
    pub amap_security_code: Option<String>,
    pub amap_base_url: String,
    pub geocode_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let listen_addr = match get("APP_LISTEN_ADDR") {
            Some(raw) => raw
                .parse()
                .map_err(|err| AppError::Config(format!("invalid APP_LISTEN_ADDR: {err}")))?,
            None => {
                let port: u16 = parse_or("PORT", get("PORT"), 4000)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let llm = LlmConfig {
            api_key: get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY")),
            base_url: checked_url(
                "LLM_API_BASE_URL",
                get("LLM_API_BASE_URL")
                    .or_else(|| get("OPENAI_BASE_URL"))
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            )?,
            model: get("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            itinerary_format: parse_or(
                "ITINERARY_FORMAT",
                get("ITINERARY_FORMAT"),
                ItineraryFormat::Markdown,
            )?,
        };

        let storage = StorageConfig {
            supabase_url: get("SUPABASE_URL")
                .map(|raw| checked_url("SUPABASE_URL", raw))
                .transpose()?,
            supabase_key: get("SUPABASE_ANON_KEY"),
            database_url: get("DATABASE_URL"),
        };

        let timeout_ms: u64 = parse_or("GEOCODE_TIMEOUT_MS", get("GEOCODE_TIMEOUT_MS"), 5000)?;
        let map = MapConfig {
            amap_key: get("AMAP_KEY"),
            amap_security_code: get("AMAP_SECURITY_CODE"),
            amap_base_url: checked_url(
                "AMAP_BASE_URL",
                get("AMAP_BASE_URL").unwrap_or_else(|| "https://restapi.amap.com".to_string()),
            )?,
            geocode_timeout: Duration::from_millis(timeout_ms),
        };

        Ok(Self {
            listen_addr,
            llm,
            storage,
            map,
            public_api_base_url: get("PUBLIC_API_BASE_URL")
                .unwrap_or_else(|| "http://localhost:4000/api".to_string()),
            speech_language: get("SPEECH_LANGUAGE").unwrap_or_else(|| "zh-CN".to_string()),
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
        })
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}

// Trailing slashes are dropped so callers can append paths directly.
fn checked_url(key: &str, raw: String) -> Result<String, AppError> {
    Url::parse(&raw).map_err(|err| AppError::Config(format!("invalid {key}: {err}")))?;
    Ok(raw.trim_end_matches('/').to_string())
}
