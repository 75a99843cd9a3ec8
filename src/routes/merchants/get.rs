use axum::{extract::State, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};

use crate::{
    authentication::MerchantId,
    database::MerchantRepository,
    domain::{AccountStatus, MerchantAccount},
    email_client::MailSender,
    routes::ApiError,
    startup::AppState,
};

/// 응답으로 보내는 프로필. 비밀번호 해시는 포함하지 않는다.
#[derive(serde::Serialize)]
pub struct ProfileResponse {
    merchant_id: uuid::Uuid,
    email: String,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    description: Option<String>,
    status: AccountStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MerchantAccount> for ProfileResponse {
    fn from(account: MerchantAccount) -> Self {
        Self {
            merchant_id: account.id,
            email: account.email.as_ref().to_string(),
            name: account.name.as_ref().to_string(),
            phone: account.phone.map(|phone| phone.as_ref().to_string()),
            address: account.address.map(|address| address.as_ref().to_string()),
            description: account
                .description
                .map(|description| description.as_ref().to_string()),
            status: account.status,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[tracing::instrument(
    name = "Get my profile",
    skip_all,
    fields(
        merchant_id = %merchant_id.0,
        error = tracing::field::Empty,
        error_detail = tracing::field::Empty,
    )
)]
pub async fn get_profile<R, M>(
    Extension(merchant_id): Extension<MerchantId>,
    State(state): State<AppState<R, M>>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let account = state.merchants.get_profile(merchant_id.0).await?;

    Ok(Json(ProfileResponse::from(account)))
}
