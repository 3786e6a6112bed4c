use chrono::Utc;
use serde::{Deserialize, Serialize};

/// EmailJS identifiers. Sending happens client-side; the server only
/// validates requests and prepares the template payload.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct EmailConfig {
    #[serde(rename = "emailjs_service_id")]
    pub service_id: Option<String>,
    #[serde(rename = "emailjs_template_id")]
    pub template_id: Option<String>,
    #[serde(rename = "emailjs_public_key")]
    pub public_key: Option<String>,
}

impl EmailConfig {
    pub fn is_configured(&self) -> bool {
        [&self.service_id, &self.template_id, &self.public_key]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EmailRequest {
    pub email: String,
    pub name: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub keyword: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct PreparedEmail {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub content: String,
    pub keyword: String,
    pub generated_date: String,
    pub from_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email, content, and keyword are required")]
    MissingFields,
    #[error("Invalid email format")]
    InvalidAddress,
}

pub fn prepare(request: EmailRequest) -> Result<PreparedEmail, EmailError> {
    if request.email.trim().is_empty()
        || request.content.trim().is_empty()
        || request.keyword.trim().is_empty()
    {
        return Err(EmailError::MissingFields);
    }
    if !is_valid_email(request.email.trim()) {
        return Err(EmailError::InvalidAddress);
    }

    let subject = request
        .subject
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("Newsletter Draft: {}", request.keyword));

    Ok(PreparedEmail {
        to_email: request.email.trim().to_string(),
        to_name: request
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Subscriber".to_string()),
        subject,
        content: request.content,
        keyword: request.keyword,
        generated_date: Utc::now().format("%Y-%m-%d").to_string(),
        from_name: "TopicScout".to_string(),
    })
}

/// Single '@' with a non-empty local part and a dot-bearing domain.
pub fn is_valid_email(address: &str) -> bool {
    if address.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = address.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("reader@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user name@example.com"));
        assert!(!is_valid_email("user@.com"));
    }
}
