use secrecy::{ExposeSecret, Secret};
use serde_aux::prelude::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use tokio::net::TcpListener;

use crate::{
    authentication::{AuthSettings, CredentialHasher},
    database::PostgresPool,
    domain::{DomainError, MerchantEmail, PasswordPolicy},
    email_client::{EmailClientError, Postmark},
};

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email_client: EmailClientSettings,
    pub authentication: AuthenticationSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    // 메일에 들어가는 링크의 기준 주소
    pub base_url: String,
    // 세션 쿠키 암호화 키. 64바이트 이상이어야 한다.
    pub hmac_secret: Secret<String>,
    // https로만 세션 쿠키를 보낼지 결정한다.
    pub secure_cookie: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub session_ttl_minutes: i64,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    // 커넥션의 암호화 요청 여부를 결정한다.
    pub require_ssl: bool,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_name: String,
    pub sender_email: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone)]
pub struct AuthenticationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub email_verification_ttl_seconds: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub password_reset_ttl_seconds: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub password_min_length: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub password_max_length: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub argon2_memory_kib: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub argon2_iterations: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub argon2_parallelism: u32,
}

/// 애플리케이션이 사용할 수 있는 런타임 환경
pub enum Environment {
    Local,
    Production,
}

// `Settings`를 이용해서 필요한 타입을 생성한다.
// 복잡함을 피하기 위해서 `get_settings`를 제외하고는 되도록이면 래퍼 함수로 작성한다.
impl Settings {
    pub fn get_settings() -> Result<Self, config::ConfigError> {
        let base_path = std::env::current_dir()
            .map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
        let settings_directory = base_path.join("settings");

        // 실행 환경을 식별한다.
        // 지정되지 않았으면 `local`로 기본 설정한다.
        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or("local".into())
            .as_str()
            .try_into()
            .map_err(config::ConfigError::Message)?;
        let environment_filename = format!("{}.json", environment.as_str());

        let settings = config::Config::builder()
            .add_source(config::File::from(settings_directory.join("base.json")))
            .add_source(config::File::from(
                settings_directory.join(environment_filename),
            ))
            // 환경 변수로부터 설정에 추가한다.
            // `APP_EMAIL_CLIENT__SENDER_NAME=Toko` => `Settings.email_client.sender_name`
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;
        settings.try_deserialize::<Settings>()
    }
}

impl ApplicationSettings {
    pub fn get_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn get_listener(&self) -> Result<TcpListener, std::io::Error> {
        TcpListener::bind(self.get_address()).await
    }
}

impl DatabaseSettings {
    pub fn connect_options_without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            // 암호화된 커넥션을 시도한다.
            // 실패하면 암호화하지 않은 커넥션을 사용한다.
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .username(&self.username)
            .password(self.password.expose_secret())
            .host(&self.host)
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn connect_options_with_db(&self) -> PgConnectOptions {
        self.connect_options_without_db()
            .database(&self.database_name)
    }

    pub fn get_pool(&self) -> PostgresPool {
        PostgresPool::connect(self.connect_options_with_db())
    }
}

impl EmailClientSettings {
    pub fn get_sender_email(&self) -> Result<MerchantEmail, DomainError> {
        MerchantEmail::try_from(self.sender_email.clone())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }

    pub fn get_email_client(&self) -> Result<Postmark, EmailClientError> {
        Postmark::from_email_client_settings(self)
    }
}

impl AuthenticationSettings {
    pub fn password_policy(&self) -> PasswordPolicy {
        PasswordPolicy {
            min_length: self.password_min_length,
            max_length: self.password_max_length,
        }
    }

    pub fn get_credential_hasher(&self) -> Result<CredentialHasher, anyhow::Error> {
        CredentialHasher::new(
            self.argon2_memory_kib,
            self.argon2_iterations,
            self.argon2_parallelism,
        )
    }

    pub fn get_auth_settings(
        &self,
        application: &ApplicationSettings,
    ) -> Result<AuthSettings, anyhow::Error> {
        Ok(AuthSettings {
            base_url: url::Url::parse(&application.base_url)?,
            email_verification_ttl: token_ttl(
                "email_verification_ttl_seconds",
                self.email_verification_ttl_seconds,
            )?,
            password_reset_ttl: token_ttl(
                "password_reset_ttl_seconds",
                self.password_reset_ttl_seconds,
            )?,
            password_policy: self.password_policy(),
        })
    }
}

// 토큰 만료 시각을 계산할 수 없는 값은 시작할 때 거절한다.
fn token_ttl(key: &str, seconds: i64) -> Result<chrono::Duration, anyhow::Error> {
    chrono::Duration::try_seconds(seconds)
        .filter(|ttl| *ttl >= chrono::Duration::zero())
        .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
        .ok_or_else(|| anyhow::anyhow!("`{key}` is out of range: {seconds}"))
}

impl Environment {
    fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<&str> for Environment {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
