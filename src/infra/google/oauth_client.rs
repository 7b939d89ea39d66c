// =============================================================================
// GOOGLE OAUTH2 CLIENT
// =============================================================================
//
// Implements `OAuthProvider`:
// - userinfo: who owns the caller's access token (for the usage log)
// - code exchange: the browser client runs Google's popup consent flow and
//   hands us the authorization code; we trade it for an access token with
//   the app's client secret, which never leaves the server.
//
// **Environment Variables:**
// - `GOOGLE_CLIENT_ID`
// - `GOOGLE_CLIENT_SECRET`

use crate::core::assistant::OAuthProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;

use super::ensure_success;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Redirect URI Google expects for codes obtained through the popup flow,
/// where the code is posted back to the opening window.
const POPUP_REDIRECT_URI: &str = "postmessage";

/// Response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: Option<String>,
}

pub struct GoogleOAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
}

impl GoogleOAuthClient {
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client: Client::new(),
            client_id,
            client_secret,
        }
    }

    fn exchange_form<'a>(&'a self, code: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", POPUP_REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ]
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    async fn user_email(
        &self,
        access_token: &str,
    ) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response, "Userinfo").await?;
        let info: UserInfo = response.json().await?;
        Ok(info.email)
    }

    async fn exchange_code(&self, code: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&self.exchange_form(code))
            .send()
            .await?;

        let response = ensure_success(response, "Token exchange").await?;
        let token: TokenResponse = response.json().await?;

        tracing::info!("Exchanged authorization code for an access token");
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_form_uses_popup_redirect() {
        let client = GoogleOAuthClient::new("id-1".to_string(), "secret-1".to_string());
        let form = client.exchange_form("4/0Abc");

        assert!(form.contains(&("code", "4/0Abc")));
        assert!(form.contains(&("client_id", "id-1")));
        assert!(form.contains(&("client_secret", "secret-1")));
        assert!(form.contains(&("redirect_uri", "postmessage")));
        assert!(form.contains(&("grant_type", "authorization_code")));
    }

    #[test]
    fn test_token_response_ignores_extra_fields() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"ya29.a0","expires_in":3599,"scope":"openid","token_type":"Bearer","id_token":"eyJ"}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "ya29.a0");
    }

    #[test]
    fn test_userinfo_without_email() {
        let info: UserInfo = serde_json::from_str(r#"{"id":"1234"}"#).unwrap();
        assert!(info.email.is_none());
    }
}
