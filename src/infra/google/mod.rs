// =============================================================================
// GOOGLE WORKSPACE MODULE
// =============================================================================
//
// Clients for the Google APIs the assistant depends on:
// - Drive v3: find the shared folder, list it, export/download files
// - Sheets v4: read and append the usage log
// - OAuth2: userinfo and authorization-code exchange
//
// **Authentication:**
// Drive, Sheets and userinfo calls all run with the *caller's* OAuth access
// token, passed in per call. Nothing is cached between requests. Only the
// code exchange uses the app's own client id/secret.

pub mod drive_client;
pub mod oauth_client;
pub mod sheets_client;

pub use drive_client::GoogleDriveClient;
pub use oauth_client::GoogleOAuthClient;
pub use sheets_client::GoogleSheetsClient;

use reqwest::Response;
use std::error::Error;

/// Turns a non-2xx response into an error carrying the body text.
async fn ensure_success(
    response: Response,
    api: &str,
) -> Result<Response, Box<dyn Error + Send + Sync>> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(format!("{} error ({}): {}", api, status, text).into())
}
