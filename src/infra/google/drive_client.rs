// =============================================================================
// GOOGLE DRIVE CLIENT
// =============================================================================
//
// Implements `DriveStore` on top of the Drive v3 REST API.
//
// **Endpoints used:**
// - `GET /drive/v3/files?q=...` - folder lookup and folder listing
// - `GET /drive/v3/files/{id}/export?mimeType=...` - Google-native and text files
// - `GET /drive/v3/files/{id}?alt=media` - raw download fallback
//
// File bodies are streamed chunk by chunk into a single buffer and decoded
// once the stream completes.

use crate::core::assistant::{DriveFile, DriveStore};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::error::Error;

use super::ensure_success;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const PAGE_SIZE: &str = "1000";

// refer to https://developers.google.com/drive/api/reference/rest/v3/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    next_page_token: Option<String>,
}

pub struct GoogleDriveClient {
    client: Client,
    files_url: String,
}

impl GoogleDriveClient {
    pub fn new() -> Self {
        Self::with_files_url(DRIVE_FILES_URL)
    }

    /// Points the client at another `files` collection URL.
    pub fn with_files_url(files_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            files_url: files_url.into(),
        }
    }

    /// Escapes a literal for use inside a single-quoted Drive query string.
    fn quote(value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "\\'")
    }

    fn folder_query(name: &str) -> String {
        format!(
            "mimeType = '{}' and name = '{}' and trashed = false",
            FOLDER_MIME_TYPE,
            Self::quote(name)
        )
    }

    fn children_query(folder_id: &str) -> String {
        format!("'{}' in parents and trashed = false", Self::quote(folder_id))
    }

    async fn list_page(
        &self,
        access_token: &str,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<FileList, Box<dyn Error + Send + Sync>> {
        let mut params = vec![
            ("q", query),
            ("fields", LIST_FIELDS),
            ("pageSize", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let response = self
            .client
            .get(&self.files_url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await?;

        let response = ensure_success(response, "Drive API").await?;
        Ok(response.json().await?)
    }

    /// Buffers a streamed body into one string.
    async fn read_streamed(response: Response) -> Result<String, Box<dyn Error + Send + Sync>> {
        let mut buffer = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for GoogleDriveClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DriveStore for GoogleDriveClient {
    async fn find_folder(
        &self,
        access_token: &str,
        name: &str,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let query = Self::folder_query(name);
        let page = self.list_page(access_token, &query, None).await?;

        if page.files.len() > 1 {
            tracing::warn!(
                folder = name,
                matches = page.files.len(),
                "Several folders share this name, using the first"
            );
        }

        Ok(page.files.into_iter().next().map(|f| f.id))
    }

    async fn list_children(
        &self,
        access_token: &str,
        folder_id: &str,
    ) -> Result<Vec<DriveFile>, Box<dyn Error + Send + Sync>> {
        let query = Self::children_query(folder_id);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self
                .list_page(access_token, &query, page_token.as_deref())
                .await?;
            files.extend(page.files);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(folder_id, files = files.len(), "Listed folder");
        Ok(files)
    }

    async fn export(
        &self,
        access_token: &str,
        file_id: &str,
        mime_type: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/{}/export", self.files_url, file_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("mimeType", mime_type)])
            .send()
            .await?;

        let response = ensure_success(response, "Drive export").await?;
        Self::read_streamed(response).await
    }

    async fn download(
        &self,
        access_token: &str,
        file_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/{}", self.files_url, file_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("alt", "media")])
            .send()
            .await?;

        let response = ensure_success(response, "Drive download").await?;
        Self::read_streamed(response).await
    }
}
