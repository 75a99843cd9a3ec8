use axum::{extract::Request, middleware::Next, response::Response};
use tokio::task::JoinHandle;
use tower_sessions::{CachingSessionStore, ExpiredDeletion};
use tower_sessions_moka_store::MokaStore;
use tower_sessions_sqlx_store::PostgresStore;
use uuid::Uuid;

use crate::{database::PostgresPool, routes::ApiError, session_state::TypedSession};

/// 로그인한 가맹점의 id. `reject_anonymous_users`가 요청 확장에 넣는다.
#[derive(Clone, Copy, Debug)]
pub struct MerchantId(pub Uuid);

pub async fn reject_anonymous_users(
    typed_session: TypedSession,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    match typed_session
        .get_merchant_id()
        .await
        .map_err(|e| ApiError::Unexpected(e.into()))?
    {
        Some(merchant_id) => {
            request.extensions_mut().insert(MerchantId(merchant_id));
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("The merchant has not logged in");
            Err(ApiError::Unauthenticated)
        }
    }
}

pub struct PgSessionStorage {
    pub session_store: CachingSessionStore<MokaStore, PostgresStore>,
    pub deletion_task: JoinHandle<Result<(), tower_sessions::session_store::Error>>,
}

impl PgSessionStorage {
    pub async fn init(pool: PostgresPool) -> Result<PgSessionStorage, anyhow::Error> {
        let pg_store = PostgresStore::new(pool.into());
        pg_store.migrate().await?;

        // 60초마다 만료된 세션을 삭제한다.
        let deletion_task = tokio::task::spawn(
            pg_store
                .clone()
                .continuously_delete_expired(tokio::time::Duration::from_secs(60)),
        );

        // 세션을 Moka( https://docs.rs/moka/latest/moka/ )로 캐싱한다.
        let session_store = CachingSessionStore::new(MokaStore::new(Some(5000)), pg_store);

        Ok(PgSessionStorage {
            session_store,
            deletion_task,
        })
    }
}
