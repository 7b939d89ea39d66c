// This is the assistant module - the request dispatch and the three flows
// (grounded Q&A, weekly report, code exchange) live here.
// Like the rest of core/, it knows nothing about HTTP or Google. It talks to
// the outside world only through the ports in `assistant_ports`.

use super::assistant_models::{AssistantReply, AssistantRequest, Command, LogEntry};
use super::assistant_ports::{DriveStore, OAuthProvider, UsageSheet};
use super::extraction::gather_context;
use super::prompts::{
    build_grounded_prompt, build_report_prompt, recent_questions, EMPTY_SHEET_MESSAGE,
    NO_QUESTIONS_MESSAGE,
};
use crate::core::ai::{AiProvider, AiService};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::error::Error;
use thiserror::Error;

pub const DEFAULT_FOLDER_NAME: &str = "PeachTreeFiles";
pub const DEFAULT_LOG_RANGE: &str = "Sheet1!A:C";
pub const DEFAULT_REPORT_WINDOW_DAYS: i64 = 7;

/// Logged in place of the email when the identity provider can't tell us.
const UNKNOWN_USER: &str = "unknown";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Missing request type")]
    MissingType,

    #[error("Unsupported request type: {0}")]
    UnsupportedType(String),

    #[error("{0}")]
    Upstream(String),
}

impl AssistantError {
    /// True when the caller sent a bad request, false when we failed.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, AssistantError::Upstream(_))
    }
}

fn upstream(
    what: &'static str,
) -> impl FnOnce(Box<dyn Error + Send + Sync>) -> AssistantError {
    move |e| AssistantError::Upstream(format!("{} failed: {}", what, e))
}

// ============================================================================
// SETTINGS
// ============================================================================

#[derive(Debug, Clone)]
pub struct AssistantSettings {
    /// Exact name of the shared folder used for grounding.
    pub folder_name: String,
    /// Sheet range questions are appended to and read back from.
    pub log_range: String,
    pub report_window: Duration,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            folder_name: DEFAULT_FOLDER_NAME.to_string(),
            log_range: DEFAULT_LOG_RANGE.to_string(),
            report_window: Duration::days(DEFAULT_REPORT_WINDOW_DAYS),
        }
    }
}

// ============================================================================
// SERVICE
// ============================================================================

/// Entry point used by the HTTP adapter. Lets the router hold a trait object
/// instead of the fully spelled-out generic service.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError>;
}

pub struct AssistantService<P, D, S, O>
where
    P: AiProvider,
    D: DriveStore,
    S: UsageSheet,
    O: OAuthProvider,
{
    ai: AiService<P>,
    drive: D,
    sheet: S,
    oauth: O,
    settings: AssistantSettings,
}

impl<P, D, S, O> AssistantService<P, D, S, O>
where
    P: AiProvider,
    D: DriveStore,
    S: UsageSheet,
    O: OAuthProvider,
{
    pub fn new(ai: AiService<P>, drive: D, sheet: S, oauth: O, settings: AssistantSettings) -> Self {
        Self {
            ai,
            drive,
            sheet,
            oauth,
            settings,
        }
    }

    /// Answers a question from the shared folder, then logs it.
    pub async fn ask(
        &self,
        prompt: &str,
        access_token: &str,
    ) -> Result<AssistantReply, AssistantError> {
        let context = self.folder_context(access_token).await?;
        let grounded = build_grounded_prompt(&context, prompt);

        let answer = self
            .ai
            .generate(&grounded)
            .await
            .map_err(upstream("Language model call"))?;

        self.log_usage(access_token, prompt).await;

        Ok(AssistantReply::Answer { response: answer })
    }

    pub async fn weekly_report(&self, access_token: &str) -> Result<AssistantReply, AssistantError> {
        self.weekly_report_at(access_token, Utc::now()).await
    }

    /// Same as `weekly_report` with an explicit "now", so the window is testable.
    pub async fn weekly_report_at(
        &self,
        access_token: &str,
        now: DateTime<Utc>,
    ) -> Result<AssistantReply, AssistantError> {
        let rows = self
            .sheet
            .read_rows(access_token, &self.settings.log_range)
            .await
            .map_err(upstream("Reading the log sheet"))?;

        // Only a header row (or nothing at all) means nothing was ever logged.
        if rows.len() <= 1 {
            return Ok(AssistantReply::Report {
                report: EMPTY_SHEET_MESSAGE.to_string(),
            });
        }

        let questions = recent_questions(&rows, now, self.settings.report_window);
        if questions.is_empty() {
            return Ok(AssistantReply::Report {
                report: NO_QUESTIONS_MESSAGE.to_string(),
            });
        }

        tracing::info!(questions = questions.len(), "Generating weekly report");

        let report = self
            .ai
            .generate(&build_report_prompt(&questions))
            .await
            .map_err(upstream("Language model call"))?;

        Ok(AssistantReply::Report { report })
    }

    pub async fn exchange_code(&self, code: &str) -> Result<AssistantReply, AssistantError> {
        let access_token = self
            .oauth
            .exchange_code(code)
            .await
            .map_err(upstream("Authorization code exchange"))?;

        Ok(AssistantReply::Token { access_token })
    }

    /// Grounding text from the shared folder; empty when there is no folder.
    async fn folder_context(&self, access_token: &str) -> Result<String, AssistantError> {
        let folder_id = self
            .drive
            .find_folder(access_token, &self.settings.folder_name)
            .await
            .map_err(upstream("Folder lookup"))?;

        let Some(folder_id) = folder_id else {
            tracing::warn!(folder = %self.settings.folder_name, "Shared folder not found");
            return Ok(String::new());
        };

        let files = self
            .drive
            .list_children(access_token, &folder_id)
            .await
            .map_err(upstream("Listing folder files"))?;

        let context = gather_context(&self.drive, access_token, &files).await;

        tracing::debug!(
            files = files.len(),
            chars = context.len(),
            "Assembled grounding context"
        );

        Ok(context)
    }

    /// Appends a usage row. Never fails the request.
    async fn log_usage(&self, access_token: &str, prompt: &str) {
        let user_email = match self.oauth.user_email(access_token).await {
            Ok(Some(email)) => email,
            Ok(None) => UNKNOWN_USER.to_string(),
            Err(e) => {
                tracing::warn!("Could not resolve user email: {}", e);
                UNKNOWN_USER.to_string()
            }
        };

        let entry = LogEntry {
            timestamp: Utc::now(),
            user_email,
            prompt: prompt.to_string(),
        };

        if let Err(e) = self
            .sheet
            .append_row(access_token, &self.settings.log_range, entry.to_row())
            .await
        {
            tracing::warn!("Failed to log question to the sheet: {}", e);
        }
    }
}

#[async_trait]
impl<P, D, S, O> RequestHandler for AssistantService<P, D, S, O>
where
    P: AiProvider,
    D: DriveStore,
    S: UsageSheet,
    O: OAuthProvider,
{
    async fn handle(&self, request: AssistantRequest) -> Result<AssistantReply, AssistantError> {
        match request.into_command()? {
            Command::Ask {
                prompt,
                access_token,
            } => self.ask(&prompt, &access_token).await,
            Command::Report { access_token } => self.weekly_report(&access_token).await,
            Command::ExchangeCode { code } => self.exchange_code(&code).await,
        }
    }
}
