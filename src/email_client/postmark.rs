use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use url::Url;

use crate::{domain::MerchantEmail, settings::EmailClientSettings};

use super::{EmailClientError, MailSender};

/// Postmark 호환 HTTP API로 메일을 보내는 클라이언트
#[derive(Clone)]
pub struct Postmark {
    http_client: Client,
    base_url: Url,
    sender_name: String,
    sender: MerchantEmail,
    authorization_token: Secret<String>,
}

// 요청 본문은 메일 한 통 동안만 유효한 참조로 구성한다.
#[derive(serde::Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl Postmark {
    pub fn new(
        base_url: &str,
        sender_name: String,
        sender: MerchantEmail,
        authorization_token: Secret<String>,
        timeout: std::time::Duration,
    ) -> Result<Self, EmailClientError> {
        // 느린 메일 서버가 요청 처리를 무한정 붙잡지 못하게 한다.
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: Url::parse(base_url)?,
            sender_name,
            sender,
            authorization_token,
        })
    }

    pub fn from_email_client_settings(
        settings: &EmailClientSettings,
    ) -> Result<Self, EmailClientError> {
        Self::new(
            &settings.base_url,
            settings.sender_name.clone(),
            settings
                .get_sender_email()
                .map_err(EmailClientError::InvalidSender)?,
            settings.authorization_token.clone(),
            settings.timeout(),
        )
    }

    fn sender_identity(&self) -> String {
        format!("{} <{}>", self.sender_name, self.sender.as_ref())
    }
}

impl MailSender for Postmark {
    #[tracing::instrument(name = "Send an email", skip_all, fields(recipient = %recipient))]
    async fn send_email(
        &self,
        recipient: &MerchantEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), EmailClientError> {
        let url = self.base_url.join("email")?;
        let request_body = SendEmailRequest {
            from: self.sender_identity(),
            to: recipient.as_ref(),
            subject,
            html_body: html_content,
            text_body: text_content,
        };

        self.http_client
            .post(url)
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&request_body)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
