use crate::analysis::types::AnalysisResult;
use crate::sources::reddit::RedditPost;

pub const MAX_PROMPT_POSTS: usize = 30;
const MAX_POST_CHARS: usize = 500;

const ANALYSIS_CONTRACT: &str = r#"ANALYSIS REQUIREMENTS:
Analyze the content and return a JSON response with the following structure (ensure it's valid JSON):

{
  "top_keywords": [
    {
      "keyword": "string",
      "relevance_score": number (0-100),
      "mentions": number,
      "context": ["context example 1", "context example 2"]
    }
  ],
  "sentiment": {
    "overall_sentiment": "positive|negative|neutral",
    "polarity_score": number (-1 to 1),
    "confidence": number (0-1),
    "emotional_tone": "descriptive tone"
  },
  "trending_topics": [
    {
      "topic": "string",
      "trend_score": number (0-100),
      "discussion_points": ["point 1", "point 2"],
      "relevance": "why this is trending"
    }
  ],
  "key_insights": ["insight 1", "insight 2", "insight 3"],
  "content_themes": ["theme 1", "theme 2", "theme 3"],
  "engagement_metrics": {
    "avg_score": number,
    "total_comments": number,
    "engagement_rate": number
  },
  "newsletter_angles": ["angle 1", "angle 2", "angle 3"]
}

SPECIFIC INSTRUCTIONS:
1. Extract the top 10-15 most relevant keywords beyond the search term
2. Provide accurate sentiment analysis with confidence scores
3. Identify 5-8 trending discussion topics
4. Generate 4-6 actionable insights for newsletter writers
5. Identify main content themes (3-5 themes)
6. Calculate engagement metrics from the post data
7. Suggest 3-5 unique newsletter angles/hooks

Focus on insights that would be valuable for content creators and newsletter writers. Make the analysis newsletter-ready and actionable."#;

pub fn build_analysis_prompt(posts: &[RedditPost], keyword: &str) -> String {
    let posts_text = posts
        .iter()
        .take(MAX_PROMPT_POSTS)
        .enumerate()
        .map(|(index, post)| {
            let content: String = post.content.chars().take(MAX_POST_CHARS).collect();
            format!(
                "POST {}:\nTitle: {}\nContent: {}\nScore: {}\nComments: {}\nSubreddit: r/{}\n---",
                index + 1,
                post.title,
                content,
                post.score,
                post.num_comments,
                post.subreddit
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "You are an expert content analyst specializing in newsletter content generation. \
         Analyze these Reddit posts about \"{}\" and provide comprehensive insights for \
         newsletter creation.\n\nREDDIT POSTS DATA:\n{}\n\n{}",
        keyword, posts_text, ANALYSIS_CONTRACT
    )
}

pub fn build_draft_prompt(keyword: &str, analysis: &AnalysisResult) -> String {
    let keywords = analysis
        .top_keywords
        .iter()
        .take(8)
        .map(|k| k.keyword.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let trends = analysis
        .trending_topics
        .iter()
        .take(5)
        .map(|t| t.topic.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Create a professional newsletter draft about "{keyword}" using this analysis data:

ANALYSIS DATA:
- Top Keywords: {keywords}
- Overall Sentiment: {sentiment} ({polarity:.2})
- Key Trends: {trends}
- Main Insights: {insights}
- Content Themes: {themes}
- Newsletter Angles: {angles}

NEWSLETTER REQUIREMENTS:
- Length: 400-500 words
- Professional, engaging tone
- Newsletter-ready format with clear sections
- Include actionable insights
- Hook readers with compelling introduction
- End with clear call-to-action

FORMAT THE NEWSLETTER WITH:
1. **Compelling Headline** (attention-grabbing)
2. **Hook Introduction** (2-3 sentences that draw readers in)
3. **Key Insights Section** (3-4 bullet points with main findings)
4. **Trending Discussions** (what people are talking about)
5. **Why This Matters** (relevance and implications)
6. **What's Next** (future outlook or actionable steps)
7. **Call to Action** (engage your audience)

Make it newsletter-ready content that a content creator could send to their subscribers immediately. Use markdown formatting for better readability."#,
        keyword = keyword,
        keywords = keywords,
        sentiment = analysis.sentiment.overall_sentiment,
        polarity = analysis.sentiment.polarity_score,
        trends = trends,
        insights = analysis.key_insights.join(" • "),
        themes = analysis.content_themes.join(", "),
        angles = analysis.newsletter_angles.join(" • "),
    )
}
