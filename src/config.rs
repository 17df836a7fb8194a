use crate::gsheets::CredentialSource;
use crate::services::telegram_service::TELEGRAM_API_BASE;
use crate::utils::AppError;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CREDENTIALS_FILE: &str = "./creds.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Stream,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    pub log_type: LogType,
    pub level: String,
    pub dir: PathBuf,
    pub app_log_name: String,
    pub max_bytes: u64,
    pub copies: usize,
}

/// Everything the service reads from the environment, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Document served by the `/edit` routes.
    pub spreadsheet_id: Option<String>,
    pub credentials: CredentialSource,
    pub http_timeout: Duration,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
    pub cors_allowed_origins: Vec<String>,
    pub logging: LogConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok(), |path| path.exists())
    }

    /// Builds the config from a key lookup. All problems are reported together.
    pub fn from_lookup<F, E>(lookup: F, file_exists: E) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
        E: Fn(&Path) -> bool,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut problems: Vec<String> = Vec::new();

        let mut parsed = |key: &str, default: u64| -> u64 {
            match get(key) {
                None => default,
                Some(raw) => raw.parse::<u64>().unwrap_or_else(|_| {
                    problems.push(format!("{} must be a positive integer (got '{}')", key, raw));
                    default
                }),
            }
        };

        let port = parsed("PORT", 3002);
        let http_timeout = parsed("SHEETS_HTTP_TIMEOUT_SECS", 30);
        let max_bytes = parsed("LOG_MAX_BYTES", 100_000_000);
        let copies = parsed("LOG_COPIES", 5);

        let port = u16::try_from(port).unwrap_or_else(|_| {
            problems.push(format!("PORT out of range: {}", port));
            3002
        });

        let credentials = match get("GOOGLE_API_CREDENTIALS_FILE") {
            Some(path) => Some(CredentialSource::File(PathBuf::from(path))),
            None if file_exists(Path::new(DEFAULT_CREDENTIALS_FILE)) => {
                Some(CredentialSource::File(PathBuf::from(DEFAULT_CREDENTIALS_FILE)))
            }
            None => get("GOOGLE_API_CREDENTIALS").map(CredentialSource::Json),
        };
        if credentials.is_none() {
            problems.push("GOOGLE_API_CREDENTIALS is undefined.".to_string());
        }

        let log_type = match get("LOG_TYPE").as_deref() {
            None | Some("stream") => LogType::Stream,
            Some("file") | Some("watched") => LogType::File,
            Some(other) => {
                problems.push(format!("LOG_TYPE must be 'stream' or 'file' (got '{}')", other));
                LogType::Stream
            }
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        match credentials {
            Some(credentials) if problems.is_empty() => Ok(Self {
                host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                spreadsheet_id: get("GOOGLE_SHEET_ID"),
                credentials,
                http_timeout: Duration::from_secs(http_timeout),
                telegram_bot_token: get("TELEGRAM_BOT_TOKEN"),
                telegram_api_url: get("TELEGRAM_API_URL")
                    .unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
                cors_allowed_origins,
                logging: LogConfig {
                    log_type,
                    level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()).to_lowercase(),
                    dir: PathBuf::from(get("LOG_DIR").unwrap_or_else(|| "./".to_string())),
                    app_log_name: get("APP_LOG_NAME").unwrap_or_else(|| "app.log".to_string()),
                    max_bytes,
                    copies: copies as usize,
                },
            }),
            _ => Err(AppError::Configuration(problems.join("; "))),
        }
    }
}
