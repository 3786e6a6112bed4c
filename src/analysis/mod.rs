pub mod composer;
pub mod fallback;
pub mod prompt;
pub mod repair;
pub mod types;

use std::sync::Arc;

use crate::llm::TextGenerator;
use crate::sources::reddit::RedditPost;

use fallback::fallback_analysis;
use prompt::build_analysis_prompt;
use repair::{parse_analysis_json, repair};
use types::AnalysisResult;

#[derive(Debug, thiserror::Error)]
#[error("no posts provided for analysis")]
pub struct EmptyInput;

/// Turns candidate posts plus a keyword into a structured analysis. Apart
/// from rejecting empty input this never fails: model errors and unusable
/// output degrade to the deterministic fallback.
pub struct ContentAnalyzer {
    llm: Arc<dyn TextGenerator>,
}

impl ContentAnalyzer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    pub async fn analyze(
        &self,
        posts: &[RedditPost],
        keyword: &str,
    ) -> Result<AnalysisResult, EmptyInput> {
        if posts.is_empty() {
            return Err(EmptyInput);
        }

        let prompt = build_analysis_prompt(posts, keyword);
        log::info!("analyzing {} posts for '{}'...", posts.len(), keyword);

        match self.llm.generate(&prompt).await {
            Ok(response) => match parse_analysis_json(&response) {
                Some(value) => Ok(repair(&value, posts)),
                None => {
                    log::warn!("analysis response was not usable JSON, using fallback analysis");
                    Ok(fallback_analysis(posts, keyword))
                }
            },
            Err(err) => {
                log::warn!("analysis call failed: {:#}, using fallback analysis", err);
                Ok(fallback_analysis(posts, keyword))
            }
        }
    }
}
