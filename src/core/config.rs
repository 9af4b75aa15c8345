use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    /// Externally reachable base URL, used for the OAuth redirect URI
    /// and for post-auth UI redirects
    pub public_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_accounts_url: String,
    pub google_oauth_api_url: String,
    pub google_api_url: String,
    pub anthropic_api_url: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "2222";
        let storage_path = env::var("OTTO_STORAGE_PATH").unwrap_or("./".to_string());
        let public_url =
            env::var("OTTO_PUBLIC_URL").unwrap_or(format!("http://{}:{}", host, port));
        // Left empty rather than panicking so the auth routes can
        // respond with a configuration error instead of crashing the
        // whole server at startup
        let google_client_id = env::var("OTTO_GOOGLE_CLIENT_ID").unwrap_or_default();
        let google_client_secret = env::var("OTTO_GOOGLE_CLIENT_SECRET").unwrap_or_default();
        let google_accounts_url = env::var("OTTO_GOOGLE_ACCOUNTS_URL")
            .unwrap_or_else(|_| "https://accounts.google.com".to_string());
        let google_oauth_api_url = env::var("OTTO_GOOGLE_OAUTH_API_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com".to_string());
        let google_api_url = env::var("OTTO_GOOGLE_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
        let anthropic_api_url = env::var("OTTO_ANTHROPIC_API_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com".to_string());
        let anthropic_api_key =
            env::var("ANTHROPIC_API_KEY").unwrap_or_else(|_| "thiswontworkforclaude".to_string());
        let anthropic_model = env::var("OTTO_ANTHROPIC_MODEL")
            .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string());

        Self {
            storage_path,
            public_url,
            google_client_id,
            google_client_secret,
            google_accounts_url,
            google_oauth_api_url,
            google_api_url,
            anthropic_api_url,
            anthropic_api_key,
            anthropic_model,
        }
    }
}
