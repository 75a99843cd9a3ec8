use axum::{extract::State, response::IntoResponse, Json};
use secrecy::Secret;

use crate::{
    authentication::Credentials,
    database::MerchantRepository,
    email_client::MailSender,
    routes::ApiError,
    session_state::TypedSession,
    startup::AppState,
};

#[derive(serde::Deserialize)]
pub struct LoginBody {
    email: String,
    password: Secret<String>,
}

#[derive(serde::Serialize)]
struct LoginResponse {
    merchant_id: uuid::Uuid,
}

#[tracing::instrument(
    name = "Log in",
    skip_all,
    fields(
        merchant_email = %body.email,
        merchant_id = tracing::field::Empty,
        error = tracing::field::Empty,
        error_detail = tracing::field::Empty,
    )
)]
pub async fn log_in<R, M>(
    session: TypedSession,
    State(state): State<AppState<R, M>>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    let credentials = Credentials {
        email: body.email,
        password: body.password,
    };
    let merchant_id = state.auth.authenticate(credentials).await?;
    tracing::Span::current().record("merchant_id", tracing::field::display(&merchant_id));

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;
    session
        .insert_merchant_id(merchant_id)
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;

    Ok(Json(LoginResponse { merchant_id }))
}

// 로그인하지 않은 상태에서 호출해도 성공한다.
pub async fn log_out(session: TypedSession) -> Result<impl IntoResponse, ApiError> {
    session
        .log_out()
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?;

    Ok(http::StatusCode::NO_CONTENT)
}
