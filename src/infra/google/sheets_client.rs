// =============================================================================
// GOOGLE SHEETS CLIENT
// =============================================================================
//
// Implements `UsageSheet` on top of the Sheets v4 values API.
//
// - `GET  /v4/spreadsheets/{id}/values/{range}` - read every logged row
// - `POST /v4/spreadsheets/{id}/values/{range}:append` - add one row
//
// Rows are appended with `USER_ENTERED`, so Sheets may turn the timestamp
// into a real date. Values come back formatted as strings either way.

use crate::core::assistant::UsageSheet;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;

use super::ensure_success;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct AppendBody<'a> {
    values: [&'a [String]; 1],
}

/// Client bound to one spreadsheet, chosen by configuration.
pub struct GoogleSheetsClient {
    client: Client,
    spreadsheet_id: String,
}

impl GoogleSheetsClient {
    pub fn new(spreadsheet_id: String) -> Self {
        Self {
            client: Client::new(),
            spreadsheet_id,
        }
    }

    /// `{base}/{spreadsheet}/values/{range}{suffix}` with every segment
    /// percent-encoded (ranges contain `!`, and sheet names may contain spaces).
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, Box<dyn Error + Send + Sync>> {
        let mut url = Url::parse(SHEETS_API_BASE)?;
        url.path_segments_mut()
            .map_err(|_| "Sheets API base URL cannot be a base")?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, suffix));
        Ok(url)
    }

    fn cell_to_string(cell: Value) -> String {
        match cell {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl UsageSheet for GoogleSheetsClient {
    async fn read_rows(
        &self,
        access_token: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, Box<dyn Error + Send + Sync>> {
        let url = self.values_url(range, "")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response, "Sheets API").await?;
        let value_range: ValueRange = response.json().await?;

        tracing::debug!(rows = value_range.values.len(), "Read log sheet");

        Ok(value_range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(Self::cell_to_string).collect())
            .collect())
    }

    async fn append_row(
        &self,
        access_token: &str,
        range: &str,
        row: Vec<String>,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let url = self.values_url(range, ":append")?;
        let body = AppendBody {
            values: [row.as_slice()],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&body)
            .send()
            .await?;

        ensure_success(response, "Sheets append").await?;
        Ok(())
    }
}
