use chrono::Utc;
use reqwest::Client;

use crate::{
    error::CatalogError,
    types::{Credential, TokenResponse},
};

/// Exchanges client credentials for a bearer token.
///
/// Posts a form-encoded `client_credentials` grant to the token endpoint.
/// This flow has no user context and no refresh token; a new exchange is the
/// only way to renew the credential.
///
/// # Arguments
///
/// * `client` - Shared HTTP client
/// * `token_url` - Token endpoint, e.g. `https://accounts.spotify.com/api/token`
/// * `client_id` / `client_secret` - Application credentials
///
/// # Errors
///
/// Every failure maps to [`CatalogError::Auth`]: transport errors, a
/// non-success status, an undecodable body, or a body without
/// `access_token`. The error text never contains the secret or the token.
pub async fn request_client_credentials(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<Credential, CatalogError> {
    let res = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await
        .map_err(|e| CatalogError::Auth(format!("token request failed: {}", e.without_url())))?;

    let status = res.status();
    if !status.is_success() {
        return Err(CatalogError::Auth(format!(
            "token endpoint returned {}",
            status
        )));
    }

    let body: TokenResponse = res
        .json()
        .await
        .map_err(|e| CatalogError::Auth(format!("malformed token response: {}", e.without_url())))?;

    match body.access_token {
        Some(token) if !token.is_empty() => {
            Ok(Credential::new(token, body.expires_in, Utc::now()))
        }
        _ => Err(CatalogError::Auth(
            "token response is missing access_token".to_string(),
        )),
    }
}
