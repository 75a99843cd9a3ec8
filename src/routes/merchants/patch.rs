use axum::{extract::State, response::IntoResponse, Extension, Json};

use crate::{
    authentication::MerchantId,
    database::MerchantRepository,
    domain::{ContactPhone, DomainError, MerchantName, ProfileText, ProfileUpdate},
    email_client::MailSender,
    routes::ApiError,
    startup::AppState,
};

use super::ProfileResponse;

// `email`, `merchant_id` 같은 식별 정보를 보내면 422로 거절된다.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilePatchBody {
    name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    description: Option<String>,
}

impl TryFrom<ProfilePatchBody> for ProfileUpdate {
    type Error = DomainError;

    fn try_from(body: ProfilePatchBody) -> Result<Self, Self::Error> {
        Ok(ProfileUpdate {
            name: body.name.map(MerchantName::try_from).transpose()?,
            phone: body.phone.map(ContactPhone::try_from).transpose()?,
            address: body.address.map(ProfileText::try_from).transpose()?,
            description: body.description.map(ProfileText::try_from).transpose()?,
        })
    }
}

#[tracing::instrument(
    name = "Update my profile",
    skip_all,
    fields(
        merchant_id = %merchant_id.0,
        error = tracing::field::Empty,
        error_detail = tracing::field::Empty,
    )
)]
pub async fn patch_profile<R, M>(
    Extension(merchant_id): Extension<MerchantId>,
    State(state): State<AppState<R, M>>,
    Json(body): Json<ProfilePatchBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let update = ProfileUpdate::try_from(body)?;
    let account = state.merchants.update_profile(merchant_id.0, update).await?;

    Ok(Json(ProfileResponse::from(account)))
}
