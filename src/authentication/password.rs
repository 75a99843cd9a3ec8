use anyhow::Context;
use argon2::{
    password_hash::SaltString, Algorithm, Argon2, Params, PasswordHash, PasswordHasher,
    PasswordVerifier, Version,
};
use secrecy::{ExposeSecret, Secret};

use crate::utils::spawn_blocking_with_tracing;

/// argon2id로 비밀번호 해시를 만들고 검증한다.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
    // 존재하지 않는 계정에 대해서도 같은 비용의 검증을 수행하기 위한 해시
    dummy_hash: Secret<String>,
}

impl CredentialHasher {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, anyhow::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to create argon2 params.")?;
        let dummy_password = Secret::new(uuid::Uuid::new_v4().to_string());
        let dummy_hash = compute_password_hash(&params, dummy_password)?;

        Ok(Self { params, dummy_hash })
    }

    #[tracing::instrument(name = "Hash password", skip_all)]
    pub async fn hash(&self, password: Secret<String>) -> Result<Secret<String>, anyhow::Error> {
        let params = self.params.clone();
        spawn_blocking_with_tracing(move || compute_password_hash(&params, password))
            .await
            .context("Failed to spawn blocking task.")?
    }

    /// 후보 비밀번호가 저장된 해시와 일치하는지 확인한다.
    /// `expected_password_hash`가 `None`이면 더미 해시로 같은 계산을 하고 `false`를 반환한다.
    #[tracing::instrument(name = "Verify password", skip_all)]
    pub async fn verify(
        &self,
        candidate: Secret<String>,
        expected_password_hash: Option<Secret<String>>,
    ) -> Result<bool, anyhow::Error> {
        let account_exists = expected_password_hash.is_some();
        let expected_password_hash =
            expected_password_hash.unwrap_or_else(|| self.dummy_hash.clone());

        let matched = spawn_blocking_with_tracing(move || {
            verify_password_hash(expected_password_hash, candidate)
        })
        .await
        // spawn_blocking은 실패할 수 있다.
        // 중첩된 Result를 갖는다.
        .context("Failed to spawn blocking task.")??;

        // 더미 해시와 일치하더라도 존재하지 않는 계정은 인증하지 않는다.
        Ok(matched && account_exists)
    }
}

fn compute_password_hash(
    params: &Params,
    password: Secret<String>,
) -> Result<Secret<String>, anyhow::Error> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to hash password.")?
        .to_string();

    Ok(Secret::new(password_hash))
}

fn verify_password_hash(
    expected_password_hash: Secret<String>,
    candidate: Secret<String>,
) -> Result<bool, anyhow::Error> {
    tracing::info_span!("Verify password hash").in_scope(|| {
        let expected_password_hash = PasswordHash::new(expected_password_hash.expose_secret())
            .map_err(|e| anyhow::anyhow!(e))
            .context("Failed to parse hash in PHC string format.")?;

        // 비용 파라미터는 PHC 문자열에서 읽는다.
        match Argon2::default()
            .verify_password(candidate.expose_secret().as_bytes(), &expected_password_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(anyhow::anyhow!(e).context("Failed to verify password hash.")),
        }
    })
}
