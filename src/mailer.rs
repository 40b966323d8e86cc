use reqwest::Client;
use serde::Serialize;

use crate::config::EmailConfig;

const EMAIL_API_URL: &str = "https://api.resend.com/emails";

#[derive(Clone)]
pub struct EmailClient {
    client: Client,
    api_key: Option<String>,
    from_email: String,
    from_name: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
}

impl EmailClient {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
        }
    }

    /// Sends through the email API, or only logs the message when no API key
    /// is configured.
    pub async fn send_email(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::info!(to = %to, subject = %subject, "email delivery disabled, logging only");
            tracing::debug!(body = %html, "email body");
            return Ok(());
        };

        let request = SendEmailRequest {
            from: format!("{} <{}>", self.from_name, self.from_email),
            to: vec![to.to_string()],
            subject: subject.to_string(),
            html: html.to_string(),
        };

        let response = self
            .client
            .post(EMAIL_API_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("email API returned {status}: {body}");
        }

        tracing::debug!(to = %to, subject = %subject, "email sent");
        Ok(())
    }

    pub async fn send_verification_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        self.send_email(to, "Verify your email", &verification_html(code))
            .await
    }

    pub async fn send_welcome(&self, to: &str, name: &str) -> anyhow::Result<()> {
        let html = wrap(&format!(
            "<h2>Welcome, {}!</h2><p>Your campus email is verified. Start swiping.</p>",
            escape(name)
        ));
        self.send_email(to, "Welcome aboard", &html).await
    }

    pub async fn send_password_reset(&self, to: &str, reset_url: &str) -> anyhow::Result<()> {
        let html = wrap(&format!(
            "<h2>Password reset</h2><p>Follow this link within one hour to choose a new password:</p>\
             <p><a href=\"{url}\">{url}</a></p><p>If you did not request this, ignore this email.</p>",
            url = escape(reset_url)
        ));
        self.send_email(to, "Reset your password", &html).await
    }

    pub async fn send_reset_success(&self, to: &str) -> anyhow::Result<()> {
        let html = wrap("<h2>Password changed</h2><p>Your password was reset successfully.</p>");
        self.send_email(to, "Password reset successful", &html).await
    }

    pub async fn send_account_deleted(&self, to: &str, name: &str) -> anyhow::Result<()> {
        let html = wrap(&format!(
            "<h2>Goodbye, {}</h2><p>Your account and all of its data have been deleted.</p>",
            escape(name)
        ));
        self.send_email(to, "Your account was deleted", &html).await
    }
}

/// Logs a failed send instead of propagating it.
pub fn log_send_failure(result: anyhow::Result<()>, kind: &str) {
    if let Err(err) = result {
        tracing::warn!(error = %err, kind = %kind, "email send failed");
    }
}

fn verification_html(code: &str) -> String {
    wrap(&format!(
        "<h2>Email verification</h2><p>Your verification code is:</p>\
         <div style=\"font-size: 32px; font-weight: bold; letter-spacing: 8px;\">{}</div>\
         <p>This code expires in 5 hours.</p>",
        escape(code)
    ))
}

fn wrap(inner: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">{inner}</div>"
    )
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_template_embeds_the_code() {
        let html = verification_html("482913");
        assert!(html.contains("482913"));
    }

    #[test]
    fn names_are_escaped() {
        assert_eq!(escape("<b>Sam & Co</b>"), "&lt;b&gt;Sam &amp; Co&lt;/b&gt;");
    }

    #[tokio::test]
    async fn without_api_key_sends_are_logged() {
        let client = EmailClient::new(&EmailConfig::default());
        client
            .send_verification_code("student@campus.edu", "123456")
            .await
            .expect("logging-only send succeeds");
    }
}
