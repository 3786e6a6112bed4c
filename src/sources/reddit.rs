use anyhow::{anyhow, Context};
use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Sub-communities searched for topical posts; only the first
/// `SEARCH_FAN_OUT` entries are queried per request.
const SUBREDDITS: [&str; 9] = [
    "all",
    "AskReddit",
    "technology",
    "news",
    "worldnews",
    "science",
    "business",
    "entrepreneur",
    "marketing",
];

const SEARCH_FAN_OUT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Reddit authentication failed: {0}")]
    Auth(#[source] anyhow::Error),
    #[error("Reddit rate limit reached")]
    RateLimited,
    #[error("Reddit search failed: {0}")]
    Unavailable(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct RedditConfig {
    #[serde(rename = "reddit_client_id", default)]
    pub client_id: String,
    #[serde(rename = "reddit_client_secret", default)]
    pub client_secret: String,
    #[serde(rename = "reddit_user_agent", default = "default_user_agent")]
    pub user_agent: String,
    /// Authenticated search host; override for tests.
    #[serde(rename = "reddit_oauth_base", default = "default_oauth_base")]
    pub oauth_base: String,
    /// Token endpoint and public search host; override for tests.
    #[serde(rename = "reddit_www_base", default = "default_www_base")]
    pub www_base: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: default_user_agent(),
            oauth_base: default_oauth_base(),
            www_base: default_www_base(),
        }
    }
}

fn default_user_agent() -> String {
    "topicscout/0.1".to_string()
}

fn default_oauth_base() -> String {
    "https://oauth.reddit.com".to_string()
}

fn default_www_base() -> String {
    "https://www.reddit.com".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u64,
    pub created_utc: f64,
    pub author: String,
    pub subreddit: String,
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub posts: Vec<RedditPost>,
    pub total_results: usize,
    pub search_query: String,
}

#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize, Debug)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize, Debug)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Deserialize, Debug)]
struct ListingChild {
    data: RawPost,
}

#[derive(Deserialize, Debug, Default)]
struct RawPost {
    #[serde(default)]
    id: String,
    title: Option<String>,
    selftext: Option<String>,
    url: Option<String>,
    permalink: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: f64,
    author: Option<String>,
    subreddit: Option<String>,
}

impl RawPost {
    fn into_post(self) -> RedditPost {
        let link = self.url.filter(|u| !u.is_empty());
        let permalink = self
            .permalink
            .filter(|p| !p.is_empty())
            .map(|p| format!("https://reddit.com{}", p));
        RedditPost {
            id: self.id,
            title: self.title.unwrap_or_default(),
            content: self
                .selftext
                .filter(|s| !s.is_empty())
                .or_else(|| link.clone())
                .unwrap_or_default(),
            url: link.or(permalink).unwrap_or_default(),
            score: self.score,
            num_comments: self.num_comments,
            created_utc: self.created_utc,
            author: self.author.unwrap_or_else(|| "unknown".to_string()),
            subreddit: self.subreddit.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Debug)]
pub struct RedditSearcher {
    config: RedditConfig,
    client: Client,
    token: Mutex<Option<String>>,
}

impl RedditSearcher {
    pub fn new(config: RedditConfig) -> Result<Self, SourceError> {
        if config.client_id.trim().is_empty() || config.client_secret.trim().is_empty() {
            return Err(SourceError::Auth(anyhow!(
                "Reddit client credentials are not configured"
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build Reddit HTTP client")?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    /// Search the prioritized sub-communities in parallel, then dedupe, rank
    /// and cap the merged results. A failing sub-query contributes zero
    /// results; only when every sub-query fails is the public search endpoint
    /// tried instead.
    pub async fn search(&self, keyword: &str, limit: usize) -> Result<SearchResult, SourceError> {
        let token = self.bearer_token().await?;
        let per_community = limit.div_ceil(SEARCH_FAN_OUT);

        log::info!("searching reddit for '{}' (limit: {})...", keyword, limit);
        let queries = SUBREDDITS
            .iter()
            .take(SEARCH_FAN_OUT)
            .map(|subreddit| self.search_community(&token, subreddit, keyword, per_community));
        let results = join_all(queries).await;

        let mut merged = Vec::new();
        let mut failures = 0;
        for (subreddit, result) in SUBREDDITS.iter().zip(results) {
            match result {
                Ok(posts) => merged.extend(posts),
                Err(err) => {
                    failures += 1;
                    log::warn!("search in r/{} failed: {:#}", subreddit, err);
                }
            }
        }

        let posts = if failures == SEARCH_FAN_OUT {
            log::warn!("authenticated search failed everywhere, trying public search");
            self.public_search(keyword, limit).await?
        } else {
            dedupe_and_rank(merged, limit)
        };

        log::info!("found {} posts for '{}'", posts.len(), keyword);
        Ok(SearchResult {
            total_results: posts.len(),
            search_query: keyword.to_string(),
            posts,
        })
    }

    async fn bearer_token(&self) -> Result<String, SourceError> {
        if let Some(token) = self.token.lock().unwrap().clone() {
            return Ok(token);
        }
        log::info!("authenticating with reddit...");
        let token = self.authenticate().await?;
        *self.token.lock().unwrap() = Some(token.clone());
        Ok(token)
    }

    async fn authenticate(&self) -> Result<String, SourceError> {
        let url = format!("{}/api/v1/access_token", self.config.www_base);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|err| SourceError::Auth(err.into()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Auth(anyhow!(
                "token endpoint returned status {}: {}",
                status,
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|err| SourceError::Auth(err.into()))?;
        Ok(token.access_token)
    }

    async fn search_community(
        &self,
        token: &str,
        subreddit: &str,
        keyword: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<RedditPost>> {
        let url = format!("{}/r/{}/search", self.config.oauth_base, subreddit);
        let limit_param = limit.to_string();
        let restrict = (subreddit != "all").to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", keyword),
                ("sort", "relevance"),
                ("limit", &limit_param),
                ("restrict_sr", &restrict),
                ("type", "link"),
                ("t", "month"),
            ])
            .send()
            .await
            .context("Reddit search request failed")?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Stale credential; drop it so the next search re-authenticates.
            self.token.lock().unwrap().take();
        }

        let response = response
            .error_for_status()
            .context("Reddit search returned error status")?;
        let listing: Listing = response.json().await.context("Reddit search JSON")?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_post())
            .collect())
    }

    async fn public_search(
        &self,
        keyword: &str,
        limit: usize,
    ) -> Result<Vec<RedditPost>, SourceError> {
        let url = format!("{}/search.json", self.config.www_base);
        let limit_param = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", keyword),
                ("sort", "relevance"),
                ("limit", &limit_param),
                ("t", "month"),
            ])
            .send()
            .await
            .map_err(|err| SourceError::Unavailable(err.into()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(SourceError::Unavailable(anyhow!(
                "public search returned status {}",
                response.status().as_u16()
            )));
        }

        let listing: Listing = response
            .json()
            .await
            .map_err(|err| SourceError::Unavailable(err.into()))?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data.into_post())
            .collect())
    }
}

/// Dedupe by case-insensitive trimmed title (first occurrence wins), rank by
/// score descending and cap at `limit`. The sort is stable, so score ties
/// keep their first-seen order.
pub fn dedupe_and_rank(posts: Vec<RedditPost>, limit: usize) -> Vec<RedditPost> {
    let mut seen = HashSet::new();
    let mut unique: Vec<RedditPost> = posts
        .into_iter()
        .filter(|post| seen.insert(post.title.trim().to_lowercase()))
        .collect();
    unique.sort_by(|a, b| b.score.cmp(&a.score));
    unique.truncate(limit);
    unique
}
