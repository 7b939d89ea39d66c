// Process configuration, read once from the environment at start-up.

use crate::core::ai::AiConfig;
use crate::core::assistant::assistant_service::{
    DEFAULT_FOLDER_NAME, DEFAULT_LOG_RANGE, DEFAULT_REPORT_WINDOW_DAYS,
};
use crate::core::assistant::AssistantSettings;
use anyhow::{anyhow, Context, Result};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_PORT: u16 = 8080;
/// Ten years. Keeps `now - window` well inside chrono's date range.
const MAX_REPORT_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub spreadsheet_id: String,
    pub folder_name: String,
    pub log_range: String,
    pub report_window_days: i64,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            get(name).ok_or_else(|| anyhow!("Missing {} environment variable!", name))
        };

        let report_window_days = match get("REPORT_WINDOW_DAYS") {
            Some(v) => v
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=MAX_REPORT_WINDOW_DAYS).contains(days))
                .ok_or_else(|| {
                    anyhow!(
                        "REPORT_WINDOW_DAYS must be between 1 and {}, got {:?}",
                        MAX_REPORT_WINDOW_DAYS,
                        v
                    )
                })?,
            None => DEFAULT_REPORT_WINDOW_DAYS,
        };

        let port = match get("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", v))?,
            None => DEFAULT_PORT,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            google_client_id: required("GOOGLE_CLIENT_ID")?,
            google_client_secret: required("GOOGLE_CLIENT_SECRET")?,
            spreadsheet_id: required("SPREADSHEET_ID")?,
            folder_name: get("DRIVE_FOLDER_NAME").unwrap_or_else(|| DEFAULT_FOLDER_NAME.to_string()),
            log_range: get("LOG_SHEET_RANGE").unwrap_or_else(|| DEFAULT_LOG_RANGE.to_string()),
            report_window_days,
            cors_origins,
            port,
        })
    }

    pub fn ai_config(&self) -> AiConfig {
        AiConfig {
            model: self.gemini_model.clone(),
            ..Default::default()
        }
    }

    pub fn assistant_settings(&self) -> AssistantSettings {
        AssistantSettings {
            folder_name: self.folder_name.clone(),
            log_range: self.log_range.clone(),
            report_window: chrono::Duration::days(self.report_window_days),
        }
    }
}
