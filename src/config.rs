use crate::email::EmailConfig;
use crate::sources::reddit::RedditConfig;
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Empty when unset; the AI services then stay unconfigured and requests
    /// answer with a configuration error instead of the process crashing.
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(flatten)]
    pub reddit: RedditConfig,
    #[serde(flatten)]
    pub email: EmailConfig,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(envy::prefixed("TOPICSCOUT_").from_env::<AppConfig>()?)
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}
