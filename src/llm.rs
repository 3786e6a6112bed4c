use anyhow::{anyhow, Error};
use async_trait::async_trait;

use rig::agent::Agent as RigAgent;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use rig::providers::gemini::completion::gemini_api_types::{
    AdditionalParameters, GenerationConfig,
};
use rig::providers::gemini::completion::CompletionModel;

/// Seam between the analysis pipeline and the model provider, so tests can
/// substitute deterministic or failing generators.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

pub struct GeminiGenerator {
    agent: RigAgent<CompletionModel>,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, model: &str) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(anyhow!("Gemini API key is not configured"));
        }

        let client = gemini::Client::new(api_key);
        let generation = GenerationConfig {
            temperature: Some(0.7),
            top_p: Some(0.9),
            max_output_tokens: Some(4096),
            ..Default::default()
        };
        let params = AdditionalParameters::default().with_config(generation);
        let agent = client
            .agent(model)
            .additional_params(serde_json::to_value(params)?)
            .build();

        Ok(Self { agent })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        self.agent
            .prompt(prompt.to_string())
            .await
            .map_err(Error::from)
    }
}
