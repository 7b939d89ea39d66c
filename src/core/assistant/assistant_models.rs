// Request-scoped values of the assistant. Nothing here outlives a request.

use super::assistant_service::AssistantError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Raw request body as the browser client sends it.
///
/// Every field is optional at this stage; `into_command` decides which ones
/// the selected `type` actually needs. A field that is not a JSON string is
/// read as absent, so a stray value never spoils the rest of the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(rename = "type", default, deserialize_with = "string_or_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub code: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// A validated request, one variant per supported `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `gemini`: answer a question from the shared folder.
    Ask {
        prompt: String,
        access_token: String,
    },
    /// `report`: summarise the past week of logged questions.
    Report { access_token: String },
    /// `token`: trade an authorization code for an access token.
    ExchangeCode { code: String },
}

impl AssistantRequest {
    pub fn into_command(self) -> Result<Command, AssistantError> {
        let kind = non_empty(self.kind).ok_or(AssistantError::MissingType)?;

        match kind.as_str() {
            "gemini" => {
                let prompt =
                    non_empty(self.prompt).ok_or(AssistantError::MissingField("prompt"))?;
                let access_token = non_empty(self.access_token)
                    .ok_or(AssistantError::MissingField("accessToken"))?;
                Ok(Command::Ask {
                    prompt,
                    access_token,
                })
            }
            "report" => {
                let access_token = non_empty(self.access_token)
                    .ok_or(AssistantError::MissingField("accessToken"))?;
                Ok(Command::Report { access_token })
            }
            "token" => {
                let code = non_empty(self.code).ok_or(AssistantError::MissingField("code"))?;
                Ok(Command::ExchangeCode { code })
            }
            _ => Err(AssistantError::UnsupportedType(kind)),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Successful reply bodies. Serialized untagged so each variant renders as
/// the bare JSON object the client expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssistantReply {
    Answer {
        response: String,
    },
    Report {
        report: String,
    },
    Token {
        #[serde(rename = "accessToken")]
        access_token: String,
    },
}

/// A file inside the shared folder, as listed by the drive.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
}

/// One usage row: when, who, and what was asked.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub user_email: String,
    pub prompt: String,
}

impl LogEntry {
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.user_email.clone(),
            self.prompt.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request(json: &str) -> AssistantRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn gemini_requires_prompt_and_token() {
        let cmd = request(r#"{"type":"gemini","prompt":"hi","accessToken":"t"}"#)
            .into_command()
            .unwrap();
        assert_eq!(
            cmd,
            Command::Ask {
                prompt: "hi".to_string(),
                access_token: "t".to_string()
            }
        );

        let err = request(r#"{"type":"gemini","accessToken":"t"}"#)
            .into_command()
            .unwrap_err();
        assert!(matches!(err, AssistantError::MissingField("prompt")));

        let err = request(r#"{"type":"gemini","prompt":"hi","accessToken":""}"#)
            .into_command()
            .unwrap_err();
        assert!(matches!(err, AssistantError::MissingField("accessToken")));
    }

    #[test]
    fn report_and_token_requirements() {
        let err = request(r#"{"type":"report"}"#).into_command().unwrap_err();
        assert!(matches!(err, AssistantError::MissingField("accessToken")));

        let err = request(r#"{"type":"token","accessToken":"t"}"#)
            .into_command()
            .unwrap_err();
        assert!(matches!(err, AssistantError::MissingField("code")));

        let cmd = request(r#"{"type":"token","code":"4/abc"}"#)
            .into_command()
            .unwrap();
        assert_eq!(
            cmd,
            Command::ExchangeCode {
                code: "4/abc".to_string()
            }
        );
    }

    #[test]
    fn non_string_fields_read_as_absent() {
        let cmd = request(r#"{"type":"token","code":"abc","accessToken":42}"#)
            .into_command()
            .unwrap();
        assert_eq!(
            cmd,
            Command::ExchangeCode {
                code: "abc".to_string()
            }
        );

        let cmd = request(r#"{"type":"gemini","prompt":"hi","accessToken":"t","code":5}"#)
            .into_command()
            .unwrap();
        assert!(matches!(cmd, Command::Ask { .. }));

        let err = request(r#"{"type":"gemini","prompt":["hi"],"accessToken":"t"}"#)
            .into_command()
            .unwrap_err();
        assert!(matches!(err, AssistantError::MissingField("prompt")));

        let err = request(r#"{"type":7,"code":"abc"}"#).into_command().unwrap_err();
        assert!(matches!(err, AssistantError::MissingType));
    }

    #[test]
    fn missing_or_unknown_type_is_rejected() {
        let err = request(r#"{"prompt":"hi"}"#).into_command().unwrap_err();
        assert!(matches!(err, AssistantError::MissingType));

        let err = request(r#"{"type":"GEMINI","prompt":"hi","accessToken":"t"}"#)
            .into_command()
            .unwrap_err();
        assert!(matches!(err, AssistantError::UnsupportedType(ref t) if t == "GEMINI"));
    }

    #[test]
    fn replies_serialize_to_bare_objects() {
        let json = serde_json::to_value(AssistantReply::Token {
            access_token: "ya29".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "accessToken": "ya29" }));

        let json = serde_json::to_value(AssistantReply::Answer {
            response: "42".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "response": "42" }));
    }

    #[test]
    fn log_entry_row_layout() {
        let entry = LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
            user_email: "va@example.com".to_string(),
            prompt: "Where is the onboarding doc?".to_string(),
        };
        assert_eq!(
            entry.to_row(),
            vec![
                "2024-03-01T09:30:00.000Z".to_string(),
                "va@example.com".to_string(),
                "Where is the onboarding doc?".to_string(),
            ]
        );
    }
}
