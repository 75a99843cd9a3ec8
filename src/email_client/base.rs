use crate::{domain::MerchantEmail, utils::error_chain_fmt};

#[derive(thiserror::Error)]
pub enum EmailClientError {
    #[error("EmailClient: Url Error")]
    UrlParseError(#[from] url::ParseError),
    #[error("EmailClient: Reqwest Error")]
    ReqwestError(#[from] reqwest::Error),
    #[error("EmailClient: Invalid sender address")]
    InvalidSender(#[source] crate::domain::DomainError),
}

impl std::fmt::Debug for EmailClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// 외부 메일 전송 수단.
/// 계정 상태 변경과 트랜잭션으로 묶이지 않으며, 호출자는 실패를 견뎌야 한다.
#[trait_variant::make(Send)]
pub trait MailSender {
    async fn send_email(
        &self,
        recipient: &MerchantEmail,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), EmailClientError>;
}
