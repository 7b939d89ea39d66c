// Ports the assistant needs from the outside world. The infra layer provides
// the Google-backed implementations; tests provide in-memory ones.
//
// Every call takes the caller's access token explicitly. Credentials live for
// one request and are never stored by an implementation.

use super::assistant_models::DriveFile;
use async_trait::async_trait;
use std::error::Error;

#[async_trait]
pub trait DriveStore: Send + Sync {
    /// Id of the non-trashed folder whose name matches exactly, if any.
    async fn find_folder(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;

    /// All non-trashed children of a folder, in listing order.
    async fn list_children(
        &self,
        access_token: &str,
        folder_id: &str,
    ) -> Result<Vec<DriveFile>, Box<dyn Error + Send + Sync>>;

    /// Exports a file's content converted to `mime_type`.
    async fn export(
        &self,
        access_token: &str,
        file_id: &str,
        mime_type: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;

    /// Downloads a file's raw bytes as text.
    async fn download(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
pub trait UsageSheet: Send + Sync {
    async fn read_rows(
        &self,
        access_token: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, Box<dyn Error + Send + Sync>>;

    async fn append_row(
        &self,
        access_token: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Email of the account behind the token, when the provider discloses it.
    async fn user_email(
        &self,
        access_token: &str,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>>;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}
