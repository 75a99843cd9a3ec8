use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use secrecy::Secret;
use url::Url;
use uuid::Uuid;

use crate::{
    database::MerchantRepository,
    domain::{
        AccountStatus, IssuedToken, MerchantEmail, NewMerchant, PasswordPolicy, TokenConsumption,
        TokenPurpose, VerificationToken,
    },
    email_client::MailSender,
};

use super::{AuthError, CredentialHasher};

/// 인증 흐름에 필요한 설정. 프로세스가 시작할 때 한 번 만든다.
#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub base_url: Url,
    pub email_verification_ttl: chrono::Duration,
    pub password_reset_ttl: chrono::Duration,
    pub password_policy: PasswordPolicy,
}

pub struct Credentials {
    pub email: String,
    pub password: Secret<String>,
}

/// 가입 결과.
/// 메일 전송은 계정 저장과 트랜잭션으로 묶이지 않으므로 실패를 따로 알린다.
#[derive(Debug)]
pub struct Registration {
    pub merchant_id: Uuid,
    pub verification_email: Result<(), AuthError>,
}

/// 계정의 보안 관련 상태 전이를 모두 담당한다.
/// 변경 가능한 상태는 저장소에만 있다.
pub struct AuthService<R, M> {
    repository: Arc<R>,
    mail_sender: Arc<M>,
    hasher: CredentialHasher,
    settings: AuthSettings,
}

impl<R, M> AuthService<R, M>
where
    R: MerchantRepository + Send + Sync,
    M: MailSender + Send + Sync,
{
    pub fn new(
        repository: Arc<R>,
        mail_sender: Arc<M>,
        hasher: CredentialHasher,
        settings: AuthSettings,
    ) -> Self {
        Self {
            repository,
            mail_sender,
            hasher,
            settings,
        }
    }

    #[tracing::instrument(
        name = "Register a new merchant",
        skip_all,
        fields(merchant_email = %new_merchant.email, merchant_id = tracing::field::Empty)
    )]
    pub async fn register(&self, new_merchant: NewMerchant) -> Result<Registration, AuthError> {
        let NewMerchant {
            email,
            password,
            profile,
        } = new_merchant;

        self.settings
            .password_policy
            .check(&password)
            .map_err(|e| AuthError::WeakCredential(e.to_string()))?;

        // 해시 계산 전에 중복을 빠르게 걸러낸다.
        // 동시에 가입하는 경우는 저장소의 유니크 제약이 막는다.
        if self.repository.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hasher.hash(password).await?;
        let account = self
            .repository
            .create(&email, password_hash, &profile)
            .await?;
        tracing::Span::current().record("merchant_id", tracing::field::display(&account.id));

        let issued_token = self
            .issue_token(account.id, TokenPurpose::EmailVerify)
            .await?;
        let verification_email = self
            .send_verification_email(&account.email, &issued_token)
            .await;
        if let Err(e) = &verification_email {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to send a verification email. The account is kept and a resend can be requested.",
            );
        }

        Ok(Registration {
            merchant_id: account.id,
            verification_email,
        })
    }

    #[tracing::instrument(name = "Verify email", skip_all, fields(merchant_id = tracing::field::Empty))]
    pub async fn verify_email(&self, token: VerificationToken) -> Result<Uuid, AuthError> {
        // 저장소가 실패하면 토큰도 소비되지 않으므로 같은 링크로 다시 시도할 수 있다.
        let account = redeemed(
            self.repository
                .activate_with_token(&token, Utc::now())
                .await?,
        )?;
        tracing::Span::current().record("merchant_id", tracing::field::display(&account.id));

        match account.status {
            // 인증 링크로 정지를 풀 수는 없다.
            AccountStatus::Suspended => Err(AuthError::AccountSuspended),
            AccountStatus::Unverified | AccountStatus::Active => Ok(account.id),
        }
    }

    /// 아직 인증하지 않은 계정에 새 인증 메일을 보낸다.
    /// 계정 존재 여부와 관계없이 호출자에게는 같은 결과를 돌려준다.
    #[tracing::instrument(name = "Resend verification email", skip_all, fields(merchant_email = %email))]
    pub async fn resend_verification(&self, email: MerchantEmail) -> Result<(), AuthError> {
        let account = match self.repository.find_by_email(&email).await? {
            Some(account) if account.status == AccountStatus::Unverified => account,
            _ => {
                tracing::info!("No unverified account for the email. Nothing to send.");
                return Ok(());
            }
        };

        let issued_token = self
            .issue_token(account.id, TokenPurpose::EmailVerify)
            .await?;
        if let Err(e) = self
            .send_verification_email(&account.email, &issued_token)
            .await
        {
            tracing::warn!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to resend a verification email.",
            );
        }

        Ok(())
    }

    // 발신자를 확인하고 계정의 uuid를 반환한다.
    #[tracing::instrument(
        name = "Validate credentials",
        skip_all,
        fields(merchant_id = tracing::field::Empty)
    )]
    pub async fn authenticate(&self, credentials: Credentials) -> Result<Uuid, AuthError> {
        // 형식이 잘못된 이메일도 존재하지 않는 계정과 똑같이 처리한다.
        let account = match MerchantEmail::try_from(credentials.email) {
            Ok(email) => self.repository.find_by_email(&email).await?,
            Err(_) => None,
        };
        let expected_password_hash = account
            .as_ref()
            .map(|account| account.password_hash.clone());

        let matched = self
            .hasher
            .verify(credentials.password, expected_password_hash)
            .await
            .context("Failed to verify password hash.")?;

        let account = match account {
            Some(account) if matched => account,
            _ => return Err(AuthError::InvalidCredentials),
        };
        tracing::Span::current().record("merchant_id", tracing::field::display(&account.id));

        match account.status {
            AccountStatus::Active => Ok(account.id),
            AccountStatus::Unverified => Err(AuthError::AccountNotVerified),
            AccountStatus::Suspended => Err(AuthError::AccountSuspended),
        }
    }

    /// 계정이 있으면 재설정 토큰을 새로 발급하고 메일을 보낸다.
    /// 계정이 없으면 아무 일도 하지 않지만 호출자에게는 같은 결과를 돌려준다.
    #[tracing::instrument(name = "Request password reset", skip_all, fields(merchant_email = %email))]
    pub async fn request_password_reset(&self, email: MerchantEmail) -> Result<(), AuthError> {
        let Some(account) = self.repository.find_by_email(&email).await? else {
            tracing::info!("No account for the email. Nothing to send.");
            return Ok(());
        };

        let issued_token = self
            .issue_token(account.id, TokenPurpose::PasswordReset)
            .await?;
        // 메일 실패를 알리면 계정 존재 여부가 드러난다.
        if let Err(e) = self
            .send_password_reset_email(&account.email, &issued_token)
            .await
        {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "Failed to send a password reset email.",
            );
        }

        Ok(())
    }

    #[tracing::instrument(name = "Reset password", skip_all, fields(merchant_id = tracing::field::Empty))]
    pub async fn reset_password(
        &self,
        token: VerificationToken,
        new_password: Secret<String>,
    ) -> Result<(), AuthError> {
        // 정책을 통과하지 못하면 토큰을 소비하지 않는다.
        self.settings
            .password_policy
            .check(&new_password)
            .map_err(|e| AuthError::WeakCredential(e.to_string()))?;
        let password_hash = self.hasher.hash(new_password).await?;

        let merchant_id = redeemed(
            self.repository
                .reset_password_with_token(&token, password_hash, Utc::now())
                .await?,
        )?;
        tracing::Span::current().record("merchant_id", tracing::field::display(&merchant_id));

        Ok(())
    }

    async fn issue_token(
        &self,
        merchant_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<IssuedToken, AuthError> {
        let ttl = match purpose {
            TokenPurpose::EmailVerify => self.settings.email_verification_ttl,
            TokenPurpose::PasswordReset => self.settings.password_reset_ttl,
        };
        let issued_token = IssuedToken::issue(merchant_id, purpose, Utc::now(), ttl)
            .context("Failed to compute the token expiry.")?;
        self.repository.update_token(&issued_token).await?;

        Ok(issued_token)
    }

    fn link(&self, path: &str, token: &VerificationToken) -> Result<Url, AuthError> {
        let mut link = self
            .settings
            .base_url
            .join(path)
            .context("Failed to build a link.")?;
        link.query_pairs_mut().append_pair("token", token.as_ref());
        Ok(link)
    }

    async fn send_verification_email(
        &self,
        recipient: &MerchantEmail,
        issued_token: &IssuedToken,
    ) -> Result<(), AuthError> {
        let link = self.link("auth/verify", &issued_token.token)?;
        let valid_for = describe_ttl(self.settings.email_verification_ttl);
        let html_body = format!(
            "Welcome to the merchant back office!<br />\
            Click <a href=\"{link}\">here</a> to verify your email address.<br />\
            The link is valid for {valid_for}."
        );
        let text_body = format!(
            "Welcome to the merchant back office!\nVisit {link} to verify your email address.\n\
            The link is valid for {valid_for}."
        );

        self.mail_sender
            .send_email(recipient, "Verify your email address", &html_body, &text_body)
            .await
            .map_err(AuthError::MailDispatchFailed)
    }

    async fn send_password_reset_email(
        &self,
        recipient: &MerchantEmail,
        issued_token: &IssuedToken,
    ) -> Result<(), AuthError> {
        let link = self.link("auth/password/reset", &issued_token.token)?;
        let valid_for = describe_ttl(self.settings.password_reset_ttl);
        let html_body = format!(
            "A password reset was requested for your merchant account.<br />\
            Click <a href=\"{link}\">here</a> to choose a new password.<br />\
            The link is valid for {valid_for}. If you did not request this, ignore this email."
        );
        let text_body = format!(
            "A password reset was requested for your merchant account.\n\
            Visit {link} to choose a new password.\n\
            The link is valid for {valid_for}. If you did not request this, ignore this email."
        );

        self.mail_sender
            .send_email(recipient, "Reset your password", &html_body, &text_body)
            .await
            .map_err(AuthError::MailDispatchFailed)
    }
}

fn redeemed<T>(consumption: TokenConsumption<T>) -> Result<T, AuthError> {
    match consumption {
        TokenConsumption::Consumed(value) => Ok(value),
        TokenConsumption::NotFound => Err(AuthError::TokenNotFound),
        TokenConsumption::Expired => Err(AuthError::TokenExpired),
        TokenConsumption::AlreadyUsed => Err(AuthError::TokenAlreadyUsed),
    }
}

// 링크의 유효 기간을 줄여서 안내하지 않도록 남은 분까지 적는다.
fn describe_ttl(ttl: chrono::Duration) -> String {
    fn plural(n: i64, unit: &str) -> String {
        match n {
            1 => format!("1 {unit}"),
            n => format!("{n} {unit}s"),
        }
    }

    let hours = ttl.num_hours();
    let minutes = ttl.num_minutes() % 60;
    match (hours, minutes) {
        (0, minutes) => plural(minutes, "minute"),
        (hours, 0) => plural(hours, "hour"),
        (hours, minutes) => format!("{} {}", plural(hours, "hour"), plural(minutes, "minute")),
    }
}
