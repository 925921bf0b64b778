use anyhow::Context;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the comment API, without trailing slash
    pub api_url: String,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> ClientConfig {
        let api_url: String = api_url.into();
        ClientConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_env() -> anyhow::Result<ClientConfig> {
        let api_url = std::env::var("HANASHI_API_URL")
            .context("retrieving HANASHI_API_URL environment variable")?;
        Ok(ClientConfig::new(api_url))
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}
