use anyhow::Context;
use serde::Deserialize;

/// Zoho OAuth2 parameters. Client id and secret are mandatory; everything
/// else has a sane default so a minimal `.env` is enough for development.
#[derive(Debug, Clone, Deserialize)]
pub struct OauthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scope: String,
    pub response_type: String,
    pub access_type: String,
    pub prompt: String,
    pub grant_type: String,
    pub state: Option<String>,
    pub auth_url: String,
    pub token_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub base_url: String,
    pub environment: String,
    pub allowed_emails: Vec<String>,
    pub oauth: OauthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url =
            std::env::var("APP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());

        let oauth = OauthConfig {
            client_id: std::env::var("ZOHO_CLIENT_ID").context("ZOHO_CLIENT_ID must be set")?,
            client_secret: std::env::var("ZOHO_CLIENT_SECRET")
                .context("ZOHO_CLIENT_SECRET must be set")?,
            redirect_url: std::env::var("ZOHO_REDIRECT_URL")
                .unwrap_or_else(|_| format!("{}/getCode", base_url)),
            scope: std::env::var("ZOHO_SCOPE").unwrap_or_else(|_| "email".into()),
            response_type: std::env::var("ZOHO_RESPONSE_TYPE").unwrap_or_else(|_| "code".into()),
            access_type: std::env::var("ZOHO_ACCESS_TYPE").unwrap_or_else(|_| "offline".into()),
            prompt: std::env::var("ZOHO_PROMPT").unwrap_or_else(|_| "consent".into()),
            grant_type: std::env::var("ZOHO_GRANT_TYPE")
                .unwrap_or_else(|_| "authorization_code".into()),
            state: std::env::var("ZOHO_STATE").ok(),
            auth_url: std::env::var("ZOHO_AUTH_URL")
                .unwrap_or_else(|_| "https://accounts.zoho.in/oauth/v2/auth".into()),
            token_url: std::env::var("ZOHO_TOKEN_URL")
                .unwrap_or_else(|_| "https://accounts.zoho.in/oauth/v2/token".into()),
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:bees.db?mode=rwc".into()),
            base_url,
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            allowed_emails: parse_allowlist(&std::env::var("ALLOWED_EMAILS").unwrap_or_default()),
            oauth,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Comma-separated, case-insensitive. Blank entries are dropped, so both
/// `""` and `", ,"` yield an empty (deny-everything) allowlist.
pub fn parse_allowlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_parsing_normalizes_and_drops_blanks() {
        let list = parse_allowlist(" Jane@X.com ,,bob@y.org , ");
        assert_eq!(list, vec!["jane@x.com".to_string(), "bob@y.org".to_string()]);
    }

    #[test]
    fn empty_allowlist_is_empty() {
        assert!(parse_allowlist("").is_empty());
        assert!(parse_allowlist(" , ").is_empty());
    }
}
