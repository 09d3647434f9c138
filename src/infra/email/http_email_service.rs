use crate::domain::{models::notification::OutgoingEmail, ports::EmailService};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};
use base64::{Engine as _, engine::general_purpose};

/// Delivers mail through the internal mail gateway's JSON endpoint.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    filename: &'a str,
    content_type: &'a str,
    content_base64: String,
}

#[derive(Serialize)]
struct MailRequest<'a> {
    from_alias: &'static str,
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    attachments: Vec<AttachmentPayload<'a>>,
}

impl<'a> From<&'a OutgoingEmail> for MailRequest<'a> {
    fn from(email: &'a OutgoingEmail) -> Self {
        let attachments = email.attachment.iter()
            .map(|a| AttachmentPayload {
                filename: &a.filename,
                content_type: &a.content_type,
                content_base64: general_purpose::STANDARD.encode(&a.data),
            })
            .collect();

        Self {
            from_alias: "rentals",
            to_addr: &email.to,
            subject: &email.subject,
            html_body: &email.html_body,
            attachments,
        }
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), AppError> {
        let request = MailRequest::from(email);
        debug!(to = %email.to, attachments = request.attachments.len(), "Posting email to mail gateway");

        let res = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Mail gateway unreachable: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Mail gateway rejected message. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
