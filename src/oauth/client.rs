//! Authorization-URL construction and the server-to-server code exchange.

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::OauthConfig;

/// Token endpoint response. Zoho reports failures as a 200 with an `error`
/// field, so nothing here is required.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("token endpoint request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("token response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn authorize_url(oauth: &OauthConfig, state: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &oauth.auth_url,
        [
            ("response_type", oauth.response_type.as_str()),
            ("client_id", oauth.client_id.as_str()),
            ("scope", oauth.scope.as_str()),
            ("redirect_uri", oauth.redirect_url.as_str()),
            ("access_type", oauth.access_type.as_str()),
            ("prompt", oauth.prompt.as_str()),
            ("state", state),
        ],
    )
}

/// POST the authorization code to the token endpoint. The body is read as
/// text first so a non-JSON response maps to [`ExchangeError::Parse`] and
/// can take the lenient redirect path instead of a hard failure.
pub async fn exchange_code(
    http: &reqwest::Client,
    oauth: &OauthConfig,
    code: &str,
) -> Result<TokenResponse, ExchangeError> {
    let params = [
        ("client_id", oauth.client_id.as_str()),
        ("client_secret", oauth.client_secret.as_str()),
        ("grant_type", oauth.grant_type.as_str()),
        ("redirect_uri", oauth.redirect_url.as_str()),
        ("code", code),
    ];

    let body = http
        .post(&oauth.token_url)
        .form(&params)
        .send()
        .await?
        .text()
        .await?;

    tracing::debug!(bytes = body.len(), "token endpoint responded");
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_oauth() -> OauthConfig {
        OauthConfig {
            client_id: "client-1".into(),
            client_secret: "secret-1".into(),
            redirect_url: "http://localhost:3000/getCode".into(),
            scope: "email".into(),
            response_type: "code".into(),
            access_type: "offline".into(),
            prompt: "consent".into(),
            grant_type: "authorization_code".into(),
            state: None,
            auth_url: "https://accounts.zoho.in/oauth/v2/auth".into(),
            token_url: "https://accounts.zoho.in/oauth/v2/token".into(),
        }
    }

    #[test]
    fn authorize_url_carries_all_parameters() {
        let url = authorize_url(&test_oauth(), "state-token").expect("url");
        assert_eq!(url.host_str(), Some("accounts.zoho.in"));
        assert_eq!(url.path(), "/oauth/v2/auth");

        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("response_type".into(), "code".into())));
        assert!(pairs.contains(&("client_id".into(), "client-1".into())));
        assert!(pairs.contains(&("scope".into(), "email".into())));
        assert!(pairs
            .contains(&("redirect_uri".into(), "http://localhost:3000/getCode".into())));
        assert!(pairs.contains(&("access_type".into(), "offline".into())));
        assert!(pairs.contains(&("prompt".into(), "consent".into())));
        assert!(pairs.contains(&("state".into(), "state-token".into())));
    }

    #[test]
    fn redirect_uri_is_percent_encoded() {
        let url = authorize_url(&test_oauth(), "s").expect("url");
        assert!(url
            .as_str()
            .contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2FgetCode"));
    }

    #[test]
    fn token_response_tolerates_partial_bodies() {
        let tok: TokenResponse =
            serde_json::from_str(r#"{"error":"invalid_code"}"#).expect("parse");
        assert!(tok.id_token.is_none());
        assert_eq!(tok.error.as_deref(), Some("invalid_code"));

        let tok: TokenResponse = serde_json::from_str(
            r#"{"access_token":"at","id_token":"it","token_type":"Bearer","expires_in":3600}"#,
        )
        .expect("parse");
        assert_eq!(tok.id_token.as_deref(), Some("it"));
    }
}
