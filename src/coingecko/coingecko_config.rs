use std::env;

pub struct CoinGeckoConfig {
    pub base_url: String,
    /// Demo-plan key. Public endpoints work without one, at a lower rate limit.
    pub api_key: Option<String>,
}

impl CoinGeckoConfig {
    pub fn from_env(base_url: impl Into<String>) -> Self {
        let api_key = env::var("COINGECKO_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            base_url: base_url.into(),
            api_key,
        }
    }
}
