use std::sync::Arc;

use uuid::Uuid;

use crate::{
    database::{MerchantDBError, MerchantRepository},
    domain::{AccountStatus, MerchantAccount, ProfileUpdate},
    utils::error_chain_fmt,
};

#[derive(thiserror::Error)]
pub enum ProfileError {
    #[error("The merchant account was not found.")]
    NotFound,
    #[error("The account is not active.")]
    AccountNotActive,
    #[error("Storage failure. Please retry.")]
    StorageFailure(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for ProfileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<MerchantDBError> for ProfileError {
    fn from(e: MerchantDBError) -> Self {
        match e {
            MerchantDBError::NotFound => ProfileError::NotFound,
            MerchantDBError::StorageFailure(e) => ProfileError::StorageFailure(e),
            e => ProfileError::UnexpectedError(e.into()),
        }
    }
}

/// 인증을 마친 가맹점의 프로필을 읽고 수정한다.
pub struct MerchantService<R> {
    repository: Arc<R>,
}

impl<R> MerchantService<R>
where
    R: MerchantRepository + Send + Sync,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[tracing::instrument(name = "Get merchant profile", skip(self))]
    pub async fn get_profile(&self, merchant_id: Uuid) -> Result<MerchantAccount, ProfileError> {
        self.active_account(merchant_id).await
    }

    #[tracing::instrument(name = "Update merchant profile", skip(self, update))]
    pub async fn update_profile(
        &self,
        merchant_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<MerchantAccount, ProfileError> {
        let account = self.active_account(merchant_id).await?;
        if update.is_empty() {
            return Ok(account);
        }

        Ok(self.repository.update_profile(merchant_id, &update).await?)
    }

    // 세션이 살아 있어도 정지된 계정은 프로필에 접근할 수 없다.
    async fn active_account(&self, merchant_id: Uuid) -> Result<MerchantAccount, ProfileError> {
        let account = self.repository.find_by_id(merchant_id).await?;
        match account.status {
            AccountStatus::Active => Ok(account),
            AccountStatus::Unverified | AccountStatus::Suspended => {
                Err(ProfileError::AccountNotActive)
            }
        }
    }
}
