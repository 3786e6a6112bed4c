use crate::analysis::repair::engagement_from_posts;
use crate::analysis::types::*;
use crate::sources::reddit::RedditPost;

/// Deterministic analysis used when the model call fails or its output is
/// unusable. Built entirely from the candidate posts and the keyword.
pub fn fallback_analysis(posts: &[RedditPost], keyword: &str) -> AnalysisResult {
    let engagement = engagement_from_posts(posts);
    AnalysisResult {
        top_keywords: vec![KeywordInsight {
            keyword: keyword.to_string(),
            relevance_score: 100.0,
            mentions: posts.len() as u64,
            context: vec!["Primary search term".to_string()],
        }],
        sentiment: SentimentAnalysis {
            overall_sentiment: Sentiment::Neutral,
            polarity_score: 0.0,
            confidence: 0.7,
            emotional_tone: "mixed discussion".to_string(),
        },
        trending_topics: vec![TrendingTopic {
            topic: format!("{} discussions", keyword),
            trend_score: 80.0,
            discussion_points: vec!["General interest".to_string()],
            relevance: "Main topic".to_string(),
        }],
        key_insights: vec![
            format!(
                "Found {} relevant discussions about {}",
                posts.len(),
                keyword
            ),
            format!(
                "Average engagement: {} upvotes per post",
                engagement.avg_score
            ),
            "Community shows active interest in this topic".to_string(),
        ],
        content_themes: vec![
            "General discussion".to_string(),
            "Community interest".to_string(),
        ],
        engagement_metrics: engagement,
        newsletter_angles: vec![
            format!("What Reddit thinks about {}", keyword),
            format!("Community insights on {}", keyword),
            format!("Latest {} discussions", keyword),
        ],
    }
}

/// Templated draft used when the model cannot produce one.
pub fn fallback_newsletter(keyword: &str, analysis: &AnalysisResult) -> String {
    let insights = analysis
        .key_insights
        .iter()
        .map(|insight| format!("• {}", insight))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"# What's Trending: {keyword}

## The Community Speaks

Recent discussions about **{keyword}** show {sentiment} sentiment across online communities, with {comments} comments and significant engagement.

## Key Insights

{insights}

## What This Means

The conversation around {keyword} reveals important trends worth watching. Community engagement metrics show {avg_score} average upvotes per discussion, indicating strong interest in this topic.

## Looking Ahead

Stay tuned for more insights as this topic continues to evolve in the community discussions.

---

*Want more insights like this? Stay connected for the latest trends and analysis.*"#,
        keyword = keyword,
        sentiment = analysis.sentiment.overall_sentiment,
        comments = analysis.engagement_metrics.total_comments,
        insights = insights,
        avg_score = analysis.engagement_metrics.avg_score,
    )
}
