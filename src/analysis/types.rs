use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_KEYWORDS: usize = 15;
pub const MAX_TRENDING_TOPICS: usize = 8;
pub const MAX_INSIGHTS: usize = 6;
pub const MAX_THEMES: usize = 5;
pub const MAX_ANGLES: usize = 5;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct KeywordInsight {
    pub keyword: String,
    pub relevance_score: f64,
    pub mentions: u64,
    pub context: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        };
        f.write_str(label)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SentimentAnalysis {
    pub overall_sentiment: Sentiment,
    pub polarity_score: f64,
    pub confidence: f64,
    pub emotional_tone: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendingTopic {
    pub topic: String,
    pub trend_score: f64,
    pub discussion_points: Vec<String>,
    pub relevance: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EngagementMetrics {
    pub avg_score: i64,
    pub total_comments: u64,
    pub engagement_rate: f64,
}

/// The validated, bounded analysis every downstream consumer can rely on.
/// Every list respects its cap and `engagement_metrics` is always computed
/// from the source posts, never taken from the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub top_keywords: Vec<KeywordInsight>,
    pub sentiment: SentimentAnalysis,
    pub trending_topics: Vec<TrendingTopic>,
    pub key_insights: Vec<String>,
    pub content_themes: Vec<String>,
    pub engagement_metrics: EngagementMetrics,
    pub newsletter_angles: Vec<String>,
}
