use std::sync::Arc;

use axum::{body::Body, routing, Router};
use http::Request;
use secrecy::ExposeSecret;
use tokio::{net::TcpListener, task::JoinHandle};
use tower::ServiceBuilder;
use tower_http::trace::{MakeSpan, TraceLayer};
use tower_sessions::{cookie::Key, Expiry, SessionManagerLayer, SessionStore};
use tracing::{Level, Span};

use crate::{
    authentication::{
        reject_anonymous_users, AuthService, AuthSettings, CredentialHasher, PgSessionStorage,
    },
    database::MerchantRepository,
    email_client::MailSender,
    error::BackofficeError,
    merchant::MerchantService,
    routes::{
        forgot_password, get_profile, health_check, log_in, log_out, patch_profile, register,
        resend_verification, reset_password, verify_email,
    },
    settings::{ApplicationSettings, Settings},
};

/// 핸들러가 공유하는 서비스.
/// 저장소와 메일 전송자는 서비스가 생성될 때 주입된다.
pub struct AppState<R, M> {
    pub auth: Arc<AuthService<R, M>>,
    pub merchants: Arc<MerchantService<R>>,
}

// `R`, `M`이 `Clone`이 아니어도 상태는 복제할 수 있어야 한다.
impl<R, M> Clone for AppState<R, M> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
            merchants: self.merchants.clone(),
        }
    }
}

impl<R, M> AppState<R, M>
where
    R: MerchantRepository + Send + Sync + 'static,
    M: MailSender + Send + Sync + 'static,
{
    pub fn new(
        repository: Arc<R>,
        mail_sender: Arc<M>,
        hasher: CredentialHasher,
        auth_settings: AuthSettings,
    ) -> Self {
        Self {
            auth: Arc::new(AuthService::new(
                repository.clone(),
                mail_sender,
                hasher,
                auth_settings,
            )),
            merchants: Arc::new(MerchantService::new(repository)),
        }
    }
}

pub struct Server {
    tcp_listener: TcpListener,
    router: Router,
    port: u16,
    deletion_task: Option<JoinHandle<Result<(), tower_sessions::session_store::Error>>>,
}

impl Server {
    /// 설정으로부터 Postgres, Postmark를 사용하는 서버를 구성한다.
    pub async fn build(settings: &Settings) -> Result<Self, BackofficeError> {
        let tcp_listener = settings.application.get_listener().await?;

        // 시작할 때 마이그레이션을 수행한다.
        let pool = settings.database.get_pool();
        pool.migrate().await?;

        let mail_sender = settings.email_client.get_email_client()?;
        let hasher = settings.authentication.get_credential_hasher()?;
        let auth_settings = settings
            .authentication
            .get_auth_settings(&settings.application)?;
        let state = AppState::new(
            Arc::new(pool.clone()),
            Arc::new(mail_sender),
            hasher,
            auth_settings,
        );

        let session_storage = PgSessionStorage::init(pool).await?;
        let mut server = Self::new(
            tcp_listener,
            state,
            session_storage.session_store,
            &settings.application,
        )?;
        server.deletion_task = Some(session_storage.deletion_task);

        Ok(server)
    }

    pub fn new<R, M, S>(
        tcp_listener: TcpListener,
        state: AppState<R, M>,
        session_store: S,
        application: &ApplicationSettings,
    ) -> Result<Self, BackofficeError>
    where
        R: MerchantRepository + Send + Sync + 'static,
        M: MailSender + Send + Sync + 'static,
        S: SessionStore + Clone,
    {
        let port = tcp_listener.local_addr()?.port();

        // 쿠키는 `hmac_secret`으로 암호화한다.
        let key = Key::try_from(application.hmac_secret.expose_secret().as_bytes())
            .map_err(|e| BackofficeError::SessionKeyError(e.to_string()))?;
        let session_layer = SessionManagerLayer::new(session_store)
            .with_private(key)
            .with_secure(application.secure_cookie)
            .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
                application.session_ttl_minutes,
            )));

        let protected = Router::new()
            .route(
                "/merchants/me",
                routing::get(get_profile::<R, M>).patch(patch_profile::<R, M>),
            )
            .layer(axum::middleware::from_fn(reject_anonymous_users));

        let router = Router::new()
            .route("/health_check", routing::get(health_check))
            .route("/auth/register", routing::post(register::<R, M>))
            .route("/auth/verify", routing::get(verify_email::<R, M>))
            .route(
                "/auth/verify/resend",
                routing::post(resend_verification::<R, M>),
            )
            .route("/auth/login", routing::post(log_in::<R, M>))
            .route("/auth/logout", routing::post(log_out))
            .route(
                "/auth/password/forgot",
                routing::post(forgot_password::<R, M>),
            )
            .route(
                "/auth/password/reset",
                routing::post(reset_password::<R, M>),
            )
            .merge(protected)
            // 위에 있는 레이어가 먼저 요청을 받는다.
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http().make_span_with(AddRequestID))
                    .layer(session_layer),
            )
            .with_state(state);

        Ok(Self {
            tcp_listener,
            router,
            port,
            deletion_task: None,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    // 종료 신호를 받을 때까지 반환하지 않는다.
    pub async fn run(self) -> Result<(), std::io::Error> {
        tracing::info!(port = self.port, "Starting Server");
        let result = axum::serve(self.tcp_listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        if let Some(deletion_task) = self.deletion_task {
            deletion_task.abort();
        }
        result
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        // 신호를 받을 수 없으면 종료하지 않고 계속 요청을 처리한다.
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

// https://docs.rs/tower-http/0.5.2/src/tower_http/trace/make_span.rs.html#65-68의 코드를 참조했음
#[derive(Clone)]
struct AddRequestID;

impl MakeSpan<Body> for AddRequestID {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        tracing::span!(
            Level::INFO,
            "request",
            request_id = %uuid::Uuid::new_v4(),
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version(),
        )
    }
}
