use std::sync::Arc;

use crate::analysis::fallback::fallback_newsletter;
use crate::analysis::prompt::build_draft_prompt;
use crate::analysis::types::AnalysisResult;
use crate::llm::TextGenerator;

/// Produces the newsletter draft from an analysis. Never fails: any model
/// problem degrades to the templated draft.
pub struct DraftComposer {
    llm: Arc<dyn TextGenerator>,
}

impl DraftComposer {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    pub async fn compose(&self, keyword: &str, analysis: &AnalysisResult) -> String {
        let prompt = build_draft_prompt(keyword, analysis);
        log::info!("generating newsletter draft for '{}'...", keyword);

        match self.llm.generate(&prompt).await {
            Ok(draft) if !draft.trim().is_empty() => draft.trim().to_string(),
            Ok(_) => {
                log::warn!("draft response was empty, using fallback draft");
                fallback_newsletter(keyword, analysis)
            }
            Err(err) => {
                log::warn!("draft call failed: {:#}, using fallback draft", err);
                fallback_newsletter(keyword, analysis)
            }
        }
    }
}
