use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

/// Claims we read out of the provider's identity token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdClaims {
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub first_name: Option<String>,
}

impl IdClaims {
    /// Display name: `name`, else `first_name`, else the email local part.
    pub fn display_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.first_name.clone())
            .or_else(|| {
                self.email
                    .as_ref()
                    .map(|e| e.split('@').next().unwrap_or(e).to_string())
            })
    }
}

/// Decode the identity token payload without verifying its signature.
///
/// The token comes straight from the provider over the server-to-server
/// exchange, but an unverified decode is still a trust gap.
/// TODO: fetch the Zoho JWKS and verify the signature before using claims.
pub fn decode_unverified(token: &str) -> anyhow::Result<IdClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<IdClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}
