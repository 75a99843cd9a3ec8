use axum::{async_trait, extract::FromRequestParts};
use http::{request::Parts, StatusCode};
use tower_sessions::Session;
use uuid::Uuid;

pub struct TypedSession {
    session: Session,
}

impl TypedSession {
    const MERCHANT_ID_KEY: &'static str = "merchant_id";

    // 세션 고정 공격을 막기 위해 로그인할 때 id를 교체한다.
    pub async fn cycle_id(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.cycle_id().await
    }

    pub async fn insert_merchant_id(
        &self,
        merchant_id: Uuid,
    ) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(Self::MERCHANT_ID_KEY, merchant_id).await
    }

    pub async fn get_merchant_id(&self) -> Result<Option<Uuid>, tower_sessions::session::Error> {
        self.session.get(Self::MERCHANT_ID_KEY).await
    }

    pub async fn log_out(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.flush().await
    }
}

// https://docs.rs/axum/0.7.5/axum/extract/index.html#accessing-other-extractors-in-fromrequest-or-fromrequestparts-implementations
// 이 곳의 코드를 참고로 했다.
#[async_trait]
impl<S> FromRequestParts<S> for TypedSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);
    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(TypedSession {
            session: Session::from_request_parts(req, state).await?,
        })
    }
}
