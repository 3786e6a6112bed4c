use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::composer::DraftComposer;
use crate::analysis::types::AnalysisResult;
use crate::analysis::ContentAnalyzer;
use crate::config::AppConfig;
use crate::llm::{GeminiGenerator, TextGenerator};
use crate::sources::reddit::{RedditSearcher, SourceError};

pub const DEFAULT_LIMIT: usize = 50;
pub const RETRY_AFTER_SECS: u64 = 60;
const MIN_KEYWORD_CHARS: usize = 2;
const MAX_KEYWORD_CHARS: usize = 100;
const SAMPLE_POSTS: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnalyzeRequest {
    pub keyword: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub settings: AnalysisSettings,
}

impl AnalyzeRequest {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            limit: DEFAULT_LIMIT,
            settings: AnalysisSettings::default(),
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Client-chosen knobs, accepted for interface stability and echoed into
/// debug logs; generation currently uses fixed sampling parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AnalysisSettings {
    pub creativity: Option<Vec<u8>>,
    #[serde(rename = "includeStats")]
    pub include_stats: Option<bool>,
    #[serde(rename = "targetAudience")]
    pub target_audience: Option<String>,
}

/// The stable outward-facing failure taxonomy. The HTTP layer maps each
/// variant to a status code and body; nothing else crosses the boundary.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("No relevant posts found for this keyword")]
    NoResultsFound,
    #[error("AI service configuration error")]
    ServiceConfiguration { details: String },
    #[error("Data source error")]
    SourceUnavailable { details: String },
    #[error("Service temporarily unavailable")]
    RateLimited { retry_after: u64 },
    #[error("Internal server error")]
    Internal { details: String },
}

impl AnalyzeError {
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            AnalyzeError::NoResultsFound => {
                Some("Try a different keyword or check your spelling")
            }
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PostSample {
    pub title: String,
    pub score: i64,
    pub subreddit: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SourceData {
    pub total_posts: usize,
    pub search_query: String,
    pub posts_sample: Vec<PostSample>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub keyword: String,
    pub analysis: AnalysisResult,
    pub newsletter_draft: String,
    pub source_data: SourceData,
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the pipeline in milliseconds.
    pub processing_time: u64,
}

/// Sequences fetch → analyze → compose for one request. Services are built
/// once at startup; a missing credential leaves its slot empty and requests
/// answer with a configuration error instead of crashing.
pub struct Orchestrator {
    reddit: Option<RedditSearcher>,
    analyzer: Option<ContentAnalyzer>,
    composer: Option<DraftComposer>,
}

impl Orchestrator {
    pub fn from_config(config: &AppConfig) -> Self {
        let reddit = match RedditSearcher::new(config.reddit.clone()) {
            Ok(searcher) => Some(searcher),
            Err(err) => {
                log::warn!("reddit search disabled: {}", err);
                None
            }
        };
        let llm: Option<Arc<dyn TextGenerator>> =
            match GeminiGenerator::new(&config.gemini_api_key, &config.gemini_model) {
                Ok(generator) => Some(Arc::new(generator)),
                Err(err) => {
                    log::warn!("gemini generation disabled: {:#}", err);
                    None
                }
            };
        Self::new(reddit, llm)
    }

    pub fn new(reddit: Option<RedditSearcher>, llm: Option<Arc<dyn TextGenerator>>) -> Self {
        let analyzer = llm.clone().map(ContentAnalyzer::new);
        let composer = llm.map(DraftComposer::new);
        Self {
            reddit,
            analyzer,
            composer,
        }
    }

    pub fn reddit_configured(&self) -> bool {
        self.reddit.is_some()
    }

    pub fn ai_configured(&self) -> bool {
        self.analyzer.is_some()
    }

    pub async fn run(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse, AnalyzeError> {
        let started = Instant::now();
        let keyword = validate_keyword(&request.keyword)?;
        log::debug!("analysis settings: {:?}", request.settings);

        let reddit = self
            .reddit
            .as_ref()
            .ok_or_else(|| AnalyzeError::ServiceConfiguration {
                details: "Reddit API credentials are not properly configured".to_string(),
            })?;
        let analyzer = self
            .analyzer
            .as_ref()
            .ok_or_else(|| AnalyzeError::ServiceConfiguration {
                details: "Gemini API key is not properly configured".to_string(),
            })?;
        let composer = self
            .composer
            .as_ref()
            .ok_or_else(|| AnalyzeError::ServiceConfiguration {
                details: "Gemini API key is not properly configured".to_string(),
            })?;

        log::info!("starting analysis for keyword: {}", keyword);
        let result = reddit
            .search(&keyword, request.limit)
            .await
            .map_err(map_source_error)?;
        if result.posts.is_empty() {
            return Err(AnalyzeError::NoResultsFound);
        }

        let analysis = analyzer
            .analyze(&result.posts, &keyword)
            .await
            .map_err(|err| AnalyzeError::Internal {
                details: err.to_string(),
            })?;
        let newsletter_draft = composer.compose(&keyword, &analysis).await;

        log::info!("analysis completed for: {}", keyword);
        Ok(AnalyzeResponse {
            success: true,
            keyword,
            analysis,
            newsletter_draft,
            source_data: SourceData {
                total_posts: result.posts.len(),
                search_query: result.search_query,
                posts_sample: result
                    .posts
                    .iter()
                    .take(SAMPLE_POSTS)
                    .map(|post| PostSample {
                        title: post.title.clone(),
                        score: post.score,
                        subreddit: post.subreddit.clone(),
                        url: post.url.clone(),
                    })
                    .collect(),
            },
            generated_at: Utc::now(),
            processing_time: started.elapsed().as_millis() as u64,
        })
    }
}

pub fn validate_keyword(keyword: &str) -> Result<String, AnalyzeError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(AnalyzeError::InvalidInput(
            "Keyword is required and must be a string".to_string(),
        ));
    }
    let length = keyword.chars().count();
    if !(MIN_KEYWORD_CHARS..=MAX_KEYWORD_CHARS).contains(&length) {
        return Err(AnalyzeError::InvalidInput(
            "Keyword must be between 2 and 100 characters".to_string(),
        ));
    }
    Ok(keyword.to_string())
}

fn map_source_error(err: SourceError) -> AnalyzeError {
    match err {
        SourceError::RateLimited => AnalyzeError::RateLimited {
            retry_after: RETRY_AFTER_SECS,
        },
        SourceError::Auth(err) | SourceError::Unavailable(err) | SourceError::Other(err) => {
            log::error!("reddit search failed: {:#}", err);
            AnalyzeError::SourceUnavailable {
                details: "Unable to fetch Reddit data. Please try again later.".to_string(),
            }
        }
    }
}
