use chrono::{DateTime, Utc};
use sqlx::{postgres::PgQueryResult, PgExecutor};
use uuid::Uuid;

use crate::domain::{
    AccountStatus, ContactPhone, DomainError, MerchantAccount, MerchantEmail, MerchantName,
    ProfileText, ProfileUpdate,
};

const MERCHANT_COLUMNS: &str = "id, email, password_hash, name, phone, address, description, \
                                status, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub struct MerchantRecord {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MerchantRecord> for MerchantAccount {
    type Error = DomainError;
    fn try_from(record: MerchantRecord) -> Result<Self, Self::Error> {
        Ok(MerchantAccount {
            id: record.id,
            email: MerchantEmail::try_from(record.email)?,
            password_hash: secrecy::Secret::new(record.password_hash),
            name: MerchantName::try_from(record.name)?,
            phone: record.phone.map(ContactPhone::try_from).transpose()?,
            address: record.address.map(ProfileText::try_from).transpose()?,
            description: record
                .description
                .map(ProfileText::try_from)
                .transpose()?,
            status: AccountStatus::try_from(record.status.as_str())?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

pub struct NewMerchantRecord<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub description: Option<&'a str>,
}

pub async fn pg_insert_merchant(
    pg_executor: impl PgExecutor<'_>,
    new_merchant: NewMerchantRecord<'_>,
) -> Result<MerchantRecord, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as::<_, MerchantRecord>(&format!(
        r#"
        INSERT INTO merchants
            (id, email, password_hash, name, phone, address, description, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
        RETURNING {MERCHANT_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new_merchant.email)
    .bind(new_merchant.password_hash)
    .bind(new_merchant.name)
    .bind(new_merchant.phone)
    .bind(new_merchant.address)
    .bind(new_merchant.description)
    .bind(AccountStatus::Unverified.as_str())
    .bind(now)
    .fetch_one(pg_executor)
    .await
}

pub async fn pg_get_merchant_by_email(
    pg_executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<MerchantRecord>, sqlx::Error> {
    sqlx::query_as::<_, MerchantRecord>(&format!(
        "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pg_executor)
    .await
}

pub async fn pg_get_merchant_by_id(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
) -> Result<Option<MerchantRecord>, sqlx::Error> {
    sqlx::query_as::<_, MerchantRecord>(&format!(
        "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE id = $1"
    ))
    .bind(merchant_id)
    .fetch_optional(pg_executor)
    .await
}

pub async fn pg_update_password(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
    password_hash: &str,
    now: DateTime<Utc>,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query("UPDATE merchants SET password_hash = $2, updated_at = $3 WHERE id = $1")
        .bind(merchant_id)
        .bind(password_hash)
        .bind(now)
        .execute(pg_executor)
        .await
}

pub async fn pg_update_status(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
    status: AccountStatus,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query("UPDATE merchants SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(merchant_id)
        .bind(status.as_str())
        .bind(Utc::now())
        .execute(pg_executor)
        .await
}

// 인증을 마치지 않은 계정만 활성화한다.
pub async fn pg_activate_merchant(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
    now: DateTime<Utc>,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query("UPDATE merchants SET status = $2, updated_at = $4 WHERE id = $1 AND status = $3")
        .bind(merchant_id)
        .bind(AccountStatus::Active.as_str())
        .bind(AccountStatus::Unverified.as_str())
        .bind(now)
        .execute(pg_executor)
        .await
}

// `NULL`로 전달된 항목은 기존 값을 유지한다.
pub async fn pg_update_profile(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
    update: &ProfileUpdate,
) -> Result<Option<MerchantRecord>, sqlx::Error> {
    sqlx::query_as::<_, MerchantRecord>(&format!(
        r#"
        UPDATE merchants SET
            name = COALESCE($2, name),
            phone = COALESCE($3, phone),
            address = COALESCE($4, address),
            description = COALESCE($5, description),
            updated_at = $6
        WHERE id = $1
        RETURNING {MERCHANT_COLUMNS}
        "#
    ))
    .bind(merchant_id)
    .bind(update.name.as_ref().map(AsRef::<str>::as_ref))
    .bind(update.phone.as_ref().map(AsRef::<str>::as_ref))
    .bind(update.address.as_ref().map(AsRef::<str>::as_ref))
    .bind(update.description.as_ref().map(AsRef::<str>::as_ref))
    .bind(Utc::now())
    .fetch_optional(pg_executor)
    .await
}

pub async fn pg_delete_unconsumed_tokens(
    pg_executor: impl PgExecutor<'_>,
    merchant_id: Uuid,
    purpose: &str,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        "DELETE FROM merchant_tokens \
        WHERE merchant_id = $1 AND purpose = $2 AND consumed_at IS NULL",
    )
    .bind(merchant_id)
    .bind(purpose)
    .execute(pg_executor)
    .await
}

pub async fn pg_insert_token(
    pg_executor: impl PgExecutor<'_>,
    token: &str,
    merchant_id: Uuid,
    purpose: &str,
    expires_at: DateTime<Utc>,
) -> Result<PgQueryResult, sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO merchant_tokens (token, merchant_id, purpose, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(token)
    .bind(merchant_id)
    .bind(purpose)
    .bind(Utc::now())
    .bind(expires_at)
    .execute(pg_executor)
    .await
}

// 확인과 소비를 하나의 조건부 갱신으로 처리한다.
// 같은 토큰에 대한 동시 요청은 행 잠금으로 직렬화되고, 늦은 쪽은 0행을 갱신한다.
pub async fn pg_consume_token(
    pg_executor: impl PgExecutor<'_>,
    token: &str,
    purpose: &str,
    now: DateTime<Utc>,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        UPDATE merchant_tokens SET consumed_at = $3
        WHERE token = $1 AND purpose = $2 AND consumed_at IS NULL AND expires_at > $3
        RETURNING merchant_id
        "#,
    )
    .bind(token)
    .bind(purpose)
    .bind(now)
    .fetch_optional(pg_executor)
    .await
}

#[derive(sqlx::FromRow)]
pub struct TokenState {
    pub consumed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

pub async fn pg_get_token_state(
    pg_executor: impl PgExecutor<'_>,
    token: &str,
    purpose: &str,
) -> Result<Option<TokenState>, sqlx::Error> {
    sqlx::query_as::<_, TokenState>(
        "SELECT consumed_at, expires_at FROM merchant_tokens WHERE token = $1 AND purpose = $2",
    )
    .bind(token)
    .bind(purpose)
    .fetch_optional(pg_executor)
    .await
}
