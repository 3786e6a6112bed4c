use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use topicscout::email::EmailConfig;
use topicscout::llm::TextGenerator;
use topicscout::orchestrator::Orchestrator;
use topicscout::server::{router, AppState};
use topicscout::sources::reddit::{RedditConfig, RedditSearcher};

struct StaticGenerator(String);

#[async_trait]
impl TextGenerator for StaticGenerator {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = router(Arc::new(state));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

fn unconfigured_state() -> AppState {
    AppState {
        orchestrator: Orchestrator::new(None, None),
        email: EmailConfig::default(),
    }
}

async fn reddit_backed_state(listing: Value) -> (MockServer, AppState) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok", "token_type": "bearer" })),
        )
        .mount(&server)
        .await;
    for subreddit in ["all", "AskReddit", "technology"] {
        Mock::given(method("GET"))
            .and(path(format!("/r/{}/search", subreddit)))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing.clone()))
            .mount(&server)
            .await;
    }
    let reddit = RedditSearcher::new(RedditConfig {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        oauth_base: server.uri(),
        www_base: server.uri(),
        ..Default::default()
    })
    .expect("searcher");
    let state = AppState {
        orchestrator: Orchestrator::new(
            Some(reddit),
            Some(Arc::new(StaticGenerator("unusable output".to_string()))),
        ),
        email: EmailConfig::default(),
    };
    (server, state)
}

fn listing_with_posts() -> Value {
    json!({
        "data": {
            "children": [
                {
                    "data": {
                        "id": "p1",
                        "title": "A discussion",
                        "selftext": "body",
                        "url": "https://example.com/p1",
                        "score": 42,
                        "num_comments": 7,
                        "created_utc": 1_700_000_000.0,
                        "author": "someone",
                        "subreddit": "news"
                    }
                }
            ]
        }
    })
}

#[tokio::test]
async fn analyze_returns_full_payload() {
    let (_reddit_server, state) = reddit_backed_state(listing_with_posts()).await;
    let base = spawn_app(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analyze", base))
        .json(&json!({ "keyword": "rust" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["keyword"], json!("rust"));
    assert_eq!(body["source_data"]["total_posts"], json!(1));
    assert!(body["newsletter_draft"].as_str().unwrap().contains("rust"));
    assert!(body["generated_at"].is_string());
    assert!(body["processing_time"].is_number());
    assert_eq!(
        body["analysis"]["engagement_metrics"]["avg_score"],
        json!(42)
    );
}

#[tokio::test]
async fn analyze_rejects_invalid_keyword() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analyze", base))
        .json(&json!({ "keyword": "a" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["success"], json!(false));
    assert_eq!(
        body["error"],
        json!("Keyword must be between 2 and 100 characters")
    );
}

#[tokio::test]
async fn analyze_reports_no_results_with_suggestion() {
    let (_reddit_server, state) =
        reddit_backed_state(json!({ "data": { "children": [] } })).await;
    let base = spawn_app(state).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analyze", base))
        .json(&json!({ "keyword": "nosuchtopic" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("No relevant posts found for this keyword"));
    assert_eq!(
        body["suggestion"],
        json!("Try a different keyword or check your spelling")
    );
}

#[tokio::test]
async fn analyze_reports_missing_configuration() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analyze", base))
        .json(&json!({ "keyword": "rust" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], json!("AI service configuration error"));
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn analyze_usage_is_documented() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::get(format!("{}/api/analyze", base))
        .await
        .expect("request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["message"], json!("TopicScout Analysis API"));
}

#[tokio::test]
async fn health_reports_degraded_without_configuration() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::get(format!("{}/api/health", base))
        .await
        .expect("request");

    assert_eq!(response.status(), 503);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["status"], json!("degraded"));
    assert_eq!(body["services"]["reddit_api"], json!("missing_config"));
    assert_eq!(body["services"]["gemini_ai"], json!("missing_config"));
    assert_eq!(body["services"]["email_service"], json!("missing_config"));
}

#[tokio::test]
async fn health_reports_healthy_when_everything_is_configured() {
    let (_reddit_server, mut state) = reddit_backed_state(listing_with_posts()).await;
    state.email = EmailConfig {
        service_id: Some("svc".to_string()),
        template_id: Some("tpl".to_string()),
        public_key: Some("pub".to_string()),
    };
    let base = spawn_app(state).await;

    let response = reqwest::get(format!("{}/api/health", base))
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn email_prepares_template_payload() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/email", base))
        .json(&json!({
            "email": "reader@example.com",
            "content": "# Draft",
            "keyword": "rust"
        }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["config"]["to_email"], json!("reader@example.com"));
    assert_eq!(body["config"]["to_name"], json!("Subscriber"));
    assert_eq!(body["config"]["subject"], json!("Newsletter Draft: rust"));
}

#[tokio::test]
async fn email_rejects_missing_fields() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/email", base))
        .json(&json!({ "email": "reader@example.com", "content": "", "keyword": "rust" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], json!("Email, content, and keyword are required"));
}

#[tokio::test]
async fn email_rejects_invalid_address() {
    let base = spawn_app(unconfigured_state()).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/email", base))
        .json(&json!({ "email": "not-an-email", "content": "# Draft", "keyword": "rust" }))
        .send()
        .await
        .expect("request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["error"], json!("Invalid email format"));
}
