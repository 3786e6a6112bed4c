use serde_json::Value;

use crate::analysis::types::*;
use crate::sources::reddit::RedditPost;

/// Strip markdown code fences from a model response.
pub fn strip_code_fences(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Slice a response down to the outermost JSON object, tolerating prose
/// before or after it.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Best-effort parse of an analysis response into an untyped tree. `None`
/// means the response is unusable and the caller should fall back.
pub fn parse_analysis_json(response: &str) -> Option<Value> {
    let cleaned = strip_code_fences(response);
    let object = extract_json_object(cleaned)?;
    let value: Value = serde_json::from_str(object).ok()?;
    value.is_object().then_some(value)
}

/// Coerce an untyped model response into a fully-typed, bounded analysis.
/// Absent or wrong-shaped fields become neutral defaults, every list is
/// capped, and engagement metrics are recomputed from the posts regardless
/// of what the model claimed.
pub fn repair(value: &Value, posts: &[RedditPost]) -> AnalysisResult {
    AnalysisResult {
        top_keywords: array(value, "top_keywords")
            .iter()
            .filter_map(keyword_insight)
            .take(MAX_KEYWORDS)
            .collect(),
        sentiment: sentiment(value.get("sentiment")),
        trending_topics: array(value, "trending_topics")
            .iter()
            .filter_map(trending_topic)
            .take(MAX_TRENDING_TOPICS)
            .collect(),
        key_insights: string_list(value, "key_insights", MAX_INSIGHTS),
        content_themes: string_list(value, "content_themes", MAX_THEMES),
        engagement_metrics: engagement_from_posts(posts),
        newsletter_angles: string_list(value, "newsletter_angles", MAX_ANGLES),
    }
}

/// Engagement is always derived from the candidate posts themselves: average
/// score rounded to the nearest integer, summed comment count, and a
/// combined rate rounded to two decimals.
pub fn engagement_from_posts(posts: &[RedditPost]) -> EngagementMetrics {
    if posts.is_empty() {
        return EngagementMetrics {
            avg_score: 0,
            total_comments: 0,
            engagement_rate: 0.0,
        };
    }
    let total_score: i64 = posts.iter().map(|p| p.score).sum();
    let total_comments: u64 = posts.iter().map(|p| p.num_comments).sum();
    let count = posts.len() as f64;
    EngagementMetrics {
        avg_score: (total_score as f64 / count).round() as i64,
        total_comments,
        engagement_rate: (((total_score as f64 + total_comments as f64) / count) * 100.0).round()
            / 100.0,
    }
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn string_list(value: &Value, key: &str, cap: usize) -> Vec<String> {
    array(value, key)
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .take(cap)
        .collect()
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn number(value: &Value, key: &str, default: f64) -> f64 {
    value.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn text(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

// Entries without a usable name carry no signal; they are dropped rather
// than padded with empty defaults.
fn keyword_insight(entry: &Value) -> Option<KeywordInsight> {
    let keyword = entry.get("keyword")?.as_str()?.trim();
    if keyword.is_empty() {
        return None;
    }
    Some(KeywordInsight {
        keyword: keyword.to_string(),
        relevance_score: number(entry, "relevance_score", 0.0).clamp(0.0, 100.0),
        mentions: number(entry, "mentions", 0.0).max(0.0) as u64,
        context: strings(entry.get("context")),
    })
}

fn trending_topic(entry: &Value) -> Option<TrendingTopic> {
    let topic = entry.get("topic")?.as_str()?.trim();
    if topic.is_empty() {
        return None;
    }
    Some(TrendingTopic {
        topic: topic.to_string(),
        trend_score: number(entry, "trend_score", 0.0).clamp(0.0, 100.0),
        discussion_points: strings(entry.get("discussion_points")),
        relevance: text(entry, "relevance"),
    })
}

fn sentiment(value: Option<&Value>) -> SentimentAnalysis {
    let Some(value) = value.filter(|v| v.is_object()) else {
        return neutral_sentiment();
    };
    let overall = match value.get("overall_sentiment").and_then(Value::as_str) {
        Some("positive") => Sentiment::Positive,
        Some("negative") => Sentiment::Negative,
        _ => Sentiment::Neutral,
    };
    SentimentAnalysis {
        overall_sentiment: overall,
        polarity_score: number(value, "polarity_score", 0.0).clamp(-1.0, 1.0),
        confidence: number(value, "confidence", 0.5).clamp(0.0, 1.0),
        emotional_tone: value
            .get("emotional_tone")
            .and_then(Value::as_str)
            .unwrap_or("mixed")
            .to_string(),
    }
}

fn neutral_sentiment() -> SentimentAnalysis {
    SentimentAnalysis {
        overall_sentiment: Sentiment::Neutral,
        polarity_score: 0.0,
        confidence: 0.5,
        emotional_tone: "mixed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Here is the analysis:\n{\"a\": 1}\nHope that helps!";
        assert_eq!(extract_json_object(text), Some("{\"a\": 1}"));
    }

    #[test]
    fn extract_rejects_text_without_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parse_rejects_truncated_json() {
        assert!(parse_analysis_json("{\"top_keywords\": [").is_none());
    }
}
