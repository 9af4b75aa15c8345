//! Google OAuth token endpoint and userinfo client

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenDenied {
    pub error: String,
    pub error_description: Option<String>,
}

/// The token endpoint reports grant failures as a JSON body rather
/// than solely via the status code, so both shapes are parsed from
/// the response regardless of status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TokenEndpointResponse {
    Granted(TokenGrant),
    Denied(TokenDenied),
}

pub async fn exchange_code_for_token(
    oauth_api_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenEndpointResponse> {
    let params = [
        ("code", code),
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];
    let url = format!("{}/token", oauth_api_url.trim_end_matches('/'));
    let response = Client::new().post(url).form(&params).send().await?;
    Ok(response.json().await?)
}

pub async fn refresh_access_token(
    oauth_api_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenEndpointResponse> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    let url = format!("{}/token", oauth_api_url.trim_end_matches('/'));
    let response = Client::new().post(url).form(&params).send().await?;
    Ok(response.json().await?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
}

/// Fetch the authorized account's profile. The email doubles as the
/// calendar identifier for all subsequent calendar calls.
pub async fn fetch_userinfo(api_url: &str, access_token: &str) -> Result<UserInfo> {
    let url = format!("{}/oauth2/v2/userinfo", api_url.trim_end_matches('/'));
    let response = Client::new()
        .get(url)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?;
    Ok(response.json().await?)
}
