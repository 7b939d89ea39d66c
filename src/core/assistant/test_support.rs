// In-memory ports shared by the assistant tests.

use super::assistant_models::DriveFile;
use super::assistant_ports::{DriveStore, OAuthProvider, UsageSheet};
use crate::core::ai::{AiConfig, AiMessage, AiProvider, AiProviderResponse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

pub fn file(id: &str, mime_type: &str) -> DriveFile {
    DriveFile {
        id: id.to_string(),
        name: format!("{}.file", id),
        mime_type: mime_type.to_string(),
    }
}

#[derive(Default)]
pub struct MockDrive {
    pub folder_id: Option<String>,
    pub fail_lookup: bool,
    pub files: Vec<DriveFile>,
    /// file id -> exported text; missing ids fail to export
    pub exports: HashMap<String, String>,
    /// file id -> downloaded text; missing ids fail to download
    pub downloads: HashMap<String, String>,
    pub calls: Mutex<Vec<String>>,
}

impl MockDrive {
    pub fn with_folder(files: Vec<DriveFile>) -> Self {
        Self {
            folder_id: Some("folder-1".to_string()),
            files,
            ..Default::default()
        }
    }

    pub fn export_text(mut self, id: &str, text: &str) -> Self {
        self.exports.insert(id.to_string(), text.to_string());
        self
    }

    pub fn download_text(mut self, id: &str, text: &str) -> Self {
        self.downloads.insert(id.to_string(), text.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DriveStore for MockDrive {
    async fn find_folder(
        &self,
        _: &str,
        name: &str,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        self.record(format!("find_folder:{}", name));
        if self.fail_lookup {
            return Err("drive unavailable".into());
        }
        Ok(self.folder_id.clone())
    }

    async fn list_children(
        &self,
        _: &str,
        folder_id: &str,
    ) -> Result<Vec<DriveFile>, Box<dyn Error + Send + Sync>> {
        self.record(format!("list_children:{}", folder_id));
        Ok(self.files.clone())
    }

    async fn export(
        &self,
        _: &str,
        file_id: &str,
        mime_type: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.record(format!("export:{}:{}", file_id, mime_type));
        self.exports
            .get(file_id)
            .cloned()
            .ok_or_else(|| format!("export failed for {}", file_id).into())
    }

    async fn download(
        &self,
        _: &str,
        file_id: &str,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        self.record(format!("download:{}", file_id));
        self.downloads
            .get(file_id)
            .cloned()
            .ok_or_else(|| format!("download failed for {}", file_id).into())
    }
}

#[derive(Default)]
pub struct MockSheet {
    pub rows: Vec<Vec<String>>,
    pub fail_append: bool,
    pub appended: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockSheet {
    pub fn with_rows(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl UsageSheet for MockSheet {
    async fn read_rows(
        &self,
        _: &str,
        _: &str,
    ) -> Result<Vec<Vec<String>>, Box<dyn Error + Send + Sync>> {
        Ok(self.rows.clone())
    }

    async fn append_row(
        &self,
        _: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if self.fail_append {
            return Err("sheet is read-only".into());
        }
        self.appended.lock().unwrap().push((range.to_string(), row));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockOAuth {
    pub email: Option<String>,
    pub fail_userinfo: bool,
    pub fail_exchange: bool,
}

#[async_trait]
impl OAuthProvider for MockOAuth {
    async fn user_email(&self, _: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        if self.fail_userinfo {
            return Err("userinfo rejected the token".into());
        }
        Ok(self.email.clone())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        if self.fail_exchange {
            return Err("invalid_grant".into());
        }
        Ok(format!("token-for-{}", code))
    }
}

/// Records every prompt it receives and answers with a canned text. The
/// prompt log is shared so tests can inspect it after handing the provider
/// over to a service.
pub struct RecordingProvider {
    pub answer: String,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl RecordingProvider {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl AiProvider for RecordingProvider {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        _: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        Ok(AiProviderResponse {
            content: self.answer.clone(),
        })
    }
}
