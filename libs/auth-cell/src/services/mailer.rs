use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

/// Outbound mail over the provider's HTTP API. Delivery is fire-and-forget:
/// failures are logged and never surface to the caller.
pub struct Mailer {
    client: Client,
    api_url: String,
    api_token: String,
    from: String,
    configured: bool,
}

impl Mailer {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.mail_api_url.clone(),
            api_token: config.mail_api_token.clone(),
            from: config.mail_from.clone(),
            configured: config.is_mail_configured(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) {
        if !self.configured {
            warn!("Mail API not configured, dropping message to {}", to);
            return;
        }

        let message = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": body
        });

        debug!("Sending mail to {}", to);

        let result = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&message)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Mail accepted for {}", to);
            }
            Ok(response) => {
                error!("Mail API rejected message to {}: {}", to, response.status());
            }
            Err(e) => {
                error!("Failed to reach mail API for {}: {}", to, e);
            }
        }
    }
}

pub fn password_message(password: &str) -> String {
    format!(
        "Welcome to the Hospital Management System!\n\n\
         Your access password is: {}\n\n\
         Hospital IT Team\n",
        password
    )
}
