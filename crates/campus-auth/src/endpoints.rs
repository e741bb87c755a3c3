//! Typed wrappers over the remote auth endpoints
//!
//! Every call goes through the gateway pipeline (correlation id, bearer
//! injection, telemetry). These functions only shape the request body and
//! decode the response; error bodies carry a human-readable `detail`
//! field which the pipeline extracts.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use campus_gateway::ApiClient;

use crate::error::Result;
use crate::types::{
    AuthResponse, ChangePasswordRequest, Identity, LoginRequest, ProfileUpdate, RegisterRequest,
    TokenPair,
};

/// Authenticate with student id and password.
pub async fn login(client: &ApiClient, request: &LoginRequest) -> Result<AuthResponse> {
    let value = client.post("/auth/login", request).await?;
    decode(value)
}

/// Create an account; the server logs the new user in directly.
pub async fn register(client: &ApiClient, request: &RegisterRequest) -> Result<AuthResponse> {
    let value = client.post("/auth/register", request).await?;
    decode(value)
}

/// Mint a new token pair from a refresh token.
///
/// Called by the background refresh scheduler before expiry and by manual
/// refresh. The superseded pair is invalid once this returns.
pub async fn refresh(client: &ApiClient, refresh_token: &str) -> Result<TokenPair> {
    let value = client
        .post("/auth/refresh", &json!({ "refresh_token": refresh_token }))
        .await?;
    decode(value)
}

/// Invalidate the server-side session for the current tokens.
pub async fn logout(client: &ApiClient) -> Result<()> {
    client.post("/auth/logout", &json!({})).await?;
    Ok(())
}

/// Change the account password. On success the server invalidates all
/// outstanding tokens for the account.
pub async fn change_password(client: &ApiClient, request: &ChangePasswordRequest) -> Result<()> {
    client.post("/auth/change-password", request).await?;
    Ok(())
}

/// Revoke every outstanding token for the account.
pub async fn revoke_all(client: &ApiClient) -> Result<()> {
    client.post("/auth/revoke-all", &json!({})).await?;
    Ok(())
}

/// Fetch the current identity.
pub async fn me(client: &ApiClient) -> Result<Identity> {
    let value = client.get("/auth/me").await?;
    decode(value)
}

/// Update profile fields; returns the replaced identity.
pub async fn update_profile(client: &ApiClient, update: &ProfileUpdate) -> Result<Identity> {
    let value = client.put("/auth/me", update).await?;
    decode(value)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| campus_gateway::Error::Decode(format!("invalid auth response: {e}")).into())
}
