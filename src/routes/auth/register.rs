use axum::{extract::State, response::IntoResponse, Json};
use secrecy::Secret;

use crate::{
    database::MerchantRepository,
    domain::{
        AccountStatus, ContactPhone, DomainError, MerchantEmail, MerchantName, MerchantProfile,
        NewMerchant, ProfileText,
    },
    email_client::MailSender,
    routes::ApiError,
    startup::AppState,
};

#[derive(serde::Deserialize)]
pub struct RegisterBody {
    email: String,
    password: Secret<String>,
    name: String,
    phone: Option<String>,
    address: Option<String>,
    description: Option<String>,
}

// 요청 본문을 도메인 타입으로 파싱한다.
impl TryFrom<RegisterBody> for NewMerchant {
    type Error = DomainError;

    fn try_from(body: RegisterBody) -> Result<Self, Self::Error> {
        let email = MerchantEmail::try_from(body.email)?;
        let profile = MerchantProfile {
            name: MerchantName::try_from(body.name)?,
            phone: body.phone.map(ContactPhone::try_from).transpose()?,
            address: body.address.map(ProfileText::try_from).transpose()?,
            description: body.description.map(ProfileText::try_from).transpose()?,
        };
        Ok(NewMerchant::new(email, body.password, profile))
    }
}

#[derive(serde::Serialize)]
struct RegisterResponse {
    merchant_id: uuid::Uuid,
    status: AccountStatus,
    verification_email_sent: bool,
}

#[tracing::instrument(
    name = "Register a merchant",
    skip_all,
    fields(
        merchant_email = %body.email,
        error = tracing::field::Empty,
        error_detail = tracing::field::Empty,
    )
)]
pub async fn register<R, M>(
    State(state): State<AppState<R, M>>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let new_merchant = NewMerchant::try_from(body)?;
    let registration = state.auth.register(new_merchant).await?;

    let response = RegisterResponse {
        merchant_id: registration.merchant_id,
        status: AccountStatus::Unverified,
        verification_email_sent: registration.verification_email.is_ok(),
    };
    Ok((http::StatusCode::CREATED, Json(response)))
}
