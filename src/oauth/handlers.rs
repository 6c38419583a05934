use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::users::repo::{Role, User};

use super::claims::{self, IdClaims};
use super::client::{self, ExchangeError, TokenResponse};
use super::policy::{self, Access};

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// `GET /authredirction`: 302 to the provider's authorization page.
///
/// The state token is the configured value, else the caller's `state` query
/// parameter, else a fixed placeholder. It is never checked against a
/// server-side nonce, so this flow is not CSRF-hardened.
#[instrument(skip(state))]
pub async fn authorize(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> ApiResult<Response> {
    let oauth = &state.config.oauth;
    let csrf_state = oauth
        .state
        .clone()
        .or(params.state)
        .unwrap_or_else(|| "default-state".into());

    let url = client::authorize_url(oauth, &csrf_state)
        .map_err(|e| ApiError::Internal(e.into()))?;
    info!(client_id = %oauth.client_id, "redirecting to provider");
    Ok(found(url.as_str()))
}

/// `GET /getCode`: exchange the authorization code, decode the identity
/// token, apply the allowlist policy, persist the user and send the browser
/// back to the front-end.
#[instrument(skip(state))]
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Response> {
    let code = params.code.ok_or(ApiError::MissingCode)?;
    info!("authorization code received");

    let token = match client::exchange_code(&state.http, &state.config.oauth, &code).await {
        Ok(token) => token,
        Err(ExchangeError::Transport(e)) => {
            error!(error = %e, "token exchange failed");
            return Err(ApiError::Upstream {
                error: "Failed to exchange authorization code for token",
                details: e.to_string(),
            });
        }
        Err(ExchangeError::Parse(e)) => {
            // Lenient fallback: do not strand the browser on an error page.
            warn!(error = %e, "unparseable token response, redirecting to landing page");
            return Ok(found(&format!("{}/?login=success", state.config.base_url)));
        }
    };

    Ok(finish_login(&state, token).await)
}

/// Post-exchange half of the flow: decode the identity token, apply the
/// allowlist policy, persist the user and choose the redirect. Split from
/// [`callback`] so it runs without a provider on the wire.
async fn finish_login(state: &AppState, token: TokenResponse) -> Response {
    if let Some(provider_error) = &token.error {
        warn!(%provider_error, "token endpoint reported an error");
    }

    let identity = token.id_token.as_deref().and_then(|raw| {
        claims::decode_unverified(raw)
            .map_err(|e| warn!(error = %e, "could not decode identity token"))
            .ok()
    });

    let Some(identity) = identity else {
        // Nothing to act on; send the browser home without identity params.
        return found(&landing_url(&state.config.base_url, None));
    };

    let email = identity.email.clone().unwrap_or_default();
    match policy::check(&email, &state.config.allowed_emails) {
        Access::Denied => {
            warn!(%email, "access denied");
            found(&denied_url(&state.config.base_url, &email))
        }
        Access::Allowed { superadmin } => {
            let role = superadmin.then_some(Role::Superadmin);
            match User::upsert(&state.db, &identity.sub, &email, role).await {
                Ok((action, _)) => {
                    info!(%email, action = action.as_str(), "user stored")
                }
                // Storage trouble must not strand an authenticated browser.
                Err(e) => error!(%email, error = %e, "failed to store user"),
            }
            found(&landing_url(&state.config.base_url, Some(&identity)))
        }
    }
}

fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn landing_url(base: &str, identity: Option<&IdClaims>) -> String {
    let Ok(mut url) = Url::parse(base) else {
        return format!("{base}/");
    };
    if let Some(identity) = identity {
        let mut query = url.query_pairs_mut();
        if let Some(email) = &identity.email {
            query.append_pair("email", email);
        }
        if let Some(name) = identity.display_name() {
            query.append_pair("name", &name);
        }
    }
    url.to_string()
}

fn denied_url(base: &str, email: &str) -> String {
    let Ok(mut url) = Url::parse(&format!("{base}/access-denied.html")) else {
        return format!("{base}/access-denied.html");
    };
    url.query_pairs_mut()
        .append_pair("email", if email.is_empty() { "unknown" } else { email });
    url.to_string()
}
