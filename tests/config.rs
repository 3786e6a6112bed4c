mod common;

use common::with_topicscout_env;
use topicscout::config::AppConfig;

#[test]
fn config_loads_with_defaults_only() {
    let _guard = with_topicscout_env(vec![]);

    let config = AppConfig::from_env().expect("Failed to parse config");

    assert_eq!(config.gemini_api_key, "");
    assert_eq!(config.gemini_model, "gemini-2.0-flash");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(config.reddit.client_id, "");
    assert_eq!(config.reddit.user_agent, "topicscout/0.1");
    assert_eq!(config.reddit.oauth_base, "https://oauth.reddit.com");
    assert_eq!(config.reddit.www_base, "https://www.reddit.com");
    assert!(!config.email.is_configured());
}

#[test]
fn config_loads_full_environment() {
    let _guard = with_topicscout_env(vec![
        ("TOPICSCOUT_GEMINI_API_KEY", "gem-key"),
        ("TOPICSCOUT_GEMINI_MODEL", "custom-model"),
        ("TOPICSCOUT_REDDIT_CLIENT_ID", "rid"),
        ("TOPICSCOUT_REDDIT_CLIENT_SECRET", "rsecret"),
        ("TOPICSCOUT_REDDIT_USER_AGENT", "my-agent/1.0"),
        ("TOPICSCOUT_BIND_ADDR", "127.0.0.1:8080"),
    ]);

    let config = AppConfig::from_env().expect("Failed to parse config");

    assert_eq!(config.gemini_api_key, "gem-key");
    assert_eq!(config.gemini_model, "custom-model");
    assert_eq!(config.reddit.client_id, "rid");
    assert_eq!(config.reddit.client_secret, "rsecret");
    assert_eq!(config.reddit.user_agent, "my-agent/1.0");
    assert_eq!(config.bind_addr, "127.0.0.1:8080");
}

#[test]
fn config_email_requires_all_three_identifiers() {
    {
        let _guard = with_topicscout_env(vec![
            ("TOPICSCOUT_EMAILJS_SERVICE_ID", "svc"),
            ("TOPICSCOUT_EMAILJS_TEMPLATE_ID", "tpl"),
        ]);
        let config = AppConfig::from_env().expect("Failed to parse config");
        assert!(!config.email.is_configured());
    }

    let _guard = with_topicscout_env(vec![
        ("TOPICSCOUT_EMAILJS_SERVICE_ID", "svc"),
        ("TOPICSCOUT_EMAILJS_TEMPLATE_ID", "tpl"),
        ("TOPICSCOUT_EMAILJS_PUBLIC_KEY", "pub"),
    ]);
    let config = AppConfig::from_env().expect("Failed to parse config");
    assert!(config.email.is_configured());
}

#[test]
fn config_endpoint_overrides_apply() {
    let _guard = with_topicscout_env(vec![
        ("TOPICSCOUT_REDDIT_OAUTH_BASE", "http://localhost:1234"),
        ("TOPICSCOUT_REDDIT_WWW_BASE", "http://localhost:5678"),
    ]);

    let config = AppConfig::from_env().expect("Failed to parse config");

    assert_eq!(config.reddit.oauth_base, "http://localhost:1234");
    assert_eq!(config.reddit.www_base, "http://localhost:5678");
}
