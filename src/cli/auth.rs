use crate::{config::Settings, error, management::TokenManager, success, utils};

/// Verifies the configured client credentials with one token exchange.
///
/// Prints when the obtained credential expires; the token itself is never
/// shown.
pub async fn auth() {
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => error!("Cannot load settings. Err: {}", e),
    };

    let pb = utils::spinner("Requesting client-credentials token...");
    let token_mgr = TokenManager::new(reqwest::Client::new(), &settings);

    match token_mgr.get_token().await {
        Ok(credential) => {
            pb.finish_and_clear();
            success!(
                "Authentication successful! Token valid until {}.",
                credential.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        Err(e) => {
            pb.finish_and_clear();
            error!("Authentication failed: {}", e);
        }
    }
}
