use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::analysis::types::AnalysisResult;
use crate::orchestrator::{AnalysisSettings, AnalyzeRequest, SourceData, DEFAULT_LIMIT};

pub const ANALYSIS_STEPS: [&str; 5] = [
    "Searching Reddit discussions...",
    "Analyzing content with AI...",
    "Extracting key insights...",
    "Generating newsletter draft...",
    "Finalizing results...",
];

const DEFAULT_STEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    pub loading: bool,
    pub current_step: usize,
    pub error: Option<String>,
    pub keyword: String,
    pub analysis: Option<AnalysisResult>,
    pub newsletter_draft: Option<String>,
    pub source_data: Option<SourceData>,
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    #[serde(default)]
    success: bool,
    error: Option<String>,
    details: Option<String>,
    analysis: Option<AnalysisResult>,
    newsletter_draft: Option<String>,
    source_data: Option<SourceData>,
}

/// Drives one analysis request against a running server while advancing a
/// cosmetic step readout. The step ticker carries no information about real
/// progress; it lives inside the request loop, so settling the request
/// always stops it.
pub struct AnalysisSession {
    http: Client,
    endpoint: Url,
    step_interval: Duration,
    state: AnalysisState,
}

impl AnalysisSession {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let endpoint = Url::parse(base_url)
            .context("Invalid server URL")?
            .join("/api/analyze")
            .context("Invalid server URL")?;
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            step_interval: DEFAULT_STEP_INTERVAL,
            state: AnalysisState::default(),
        })
    }

    /// Shorten the cosmetic step cadence (used by tests).
    pub fn with_step_interval(mut self, interval: Duration) -> Self {
        self.step_interval = interval;
        self
    }

    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub async fn start_analysis(&mut self, keyword: &str, settings: AnalysisSettings) {
        let keyword = keyword.trim().to_string();
        if keyword.is_empty() {
            self.fail("Please enter a keyword");
            return;
        }
        if !(2..=100).contains(&keyword.chars().count()) {
            self.fail("Keyword must be between 2 and 100 characters");
            return;
        }

        self.state = AnalysisState {
            loading: true,
            keyword: keyword.clone(),
            ..Default::default()
        };
        log::info!("{}", ANALYSIS_STEPS[0]);

        let request = AnalyzeRequest {
            keyword,
            limit: DEFAULT_LIMIT,
            settings,
        };
        let send = self.http.post(self.endpoint.clone()).json(&request).send();
        tokio::pin!(send);
        let mut ticker = tokio::time::interval_at(
            tokio::time::Instant::now() + self.step_interval,
            self.step_interval,
        );

        let outcome = loop {
            tokio::select! {
                outcome = &mut send => break outcome,
                _ = ticker.tick() => {
                    // Advance until the last label, then idle until the
                    // request settles.
                    if self.state.current_step + 1 < ANALYSIS_STEPS.len() {
                        self.state.current_step += 1;
                        log::info!("{}", ANALYSIS_STEPS[self.state.current_step]);
                    }
                }
            }
        };

        match outcome {
            Ok(response) => {
                let status = response.status();
                match response.json::<ApiResponse>().await {
                    Ok(body) if status.is_success() && body.success => self.succeed(body),
                    Ok(body) => {
                        let message = failure_message(status, body);
                        self.fail(&message);
                    }
                    Err(err) => {
                        log::debug!("undecodable response: {}", err);
                        self.fail("Analysis failed. Please try again.");
                    }
                }
            }
            Err(err) => {
                log::debug!("transport failure: {}", err);
                self.fail("Network error. Please check your connection and try again.");
            }
        }
    }

    /// Clears only the error; loading and result state are untouched.
    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    pub fn reset(&mut self) {
        self.state = AnalysisState::default();
    }

    pub fn progress(&self) -> u8 {
        progress_value(
            self.state.loading,
            self.state.current_step,
            self.state.analysis.is_some(),
        )
    }

    pub fn current_step_text(&self) -> &'static str {
        if self.state.current_step >= ANALYSIS_STEPS.len() {
            "Analysis complete!"
        } else {
            ANALYSIS_STEPS[self.state.current_step]
        }
    }

    fn succeed(&mut self, body: ApiResponse) {
        self.state.loading = false;
        self.state.current_step = ANALYSIS_STEPS.len();
        self.state.analysis = body.analysis;
        self.state.newsletter_draft = body.newsletter_draft;
        self.state.source_data = body.source_data;
        self.state.error = None;
    }

    fn fail(&mut self, message: &str) {
        self.state.error = Some(message.to_string());
        self.state.loading = false;
        self.state.current_step = 0;
    }
}

/// Never shows 100 until a real result has landed.
pub fn progress_value(loading: bool, current_step: usize, has_result: bool) -> u8 {
    if !loading && has_result {
        return 100;
    }
    if !loading {
        return 0;
    }
    let percent = (current_step * 100 / ANALYSIS_STEPS.len()) as u8;
    percent.min(95)
}

fn failure_message(status: StatusCode, body: ApiResponse) -> String {
    let raw = body
        .error
        .unwrap_or_else(|| format!("HTTP {}: request failed", status.as_u16()));
    if let Some(mapped) = friendly_error_message(&raw) {
        return mapped;
    }
    if let Some(mapped) = body.details.as_deref().and_then(friendly_error_message) {
        return mapped;
    }
    raw
}

/// Known failure texts get friendlier copy; anything else passes through.
pub fn friendly_error_message(raw: &str) -> Option<String> {
    let lowered = raw.to_lowercase();
    if lowered.contains("rate limit") {
        return Some("Too many requests. Please wait a moment and try again.".to_string());
    }
    if raw.contains("No relevant posts") {
        return Some(
            "No discussions found for this keyword. Try a different or more general term."
                .to_string(),
        );
    }
    None
}
