use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use secrecy::Secret;
use uuid::Uuid;

use crate::domain::{
    AccountStatus, IssuedToken, MerchantAccount, MerchantEmail, MerchantProfile, ProfileUpdate,
    TokenConsumption, TokenPurpose, VerificationToken,
};

use super::{MerchantDBError, MerchantRepository};

struct StoredToken {
    merchant_id: Uuid,
    purpose: TokenPurpose,
    expires_at: DateTime<Utc>,
    consumed_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<Uuid, MerchantAccount>,
    // 이메일 유니크 인덱스 역할을 한다.
    emails: HashMap<MerchantEmail, Uuid>,
    tokens: HashMap<String, StoredToken>,
}

impl Store {
    fn account_mut(&mut self, merchant_id: Uuid) -> Result<&mut MerchantAccount, MerchantDBError> {
        self.accounts
            .get_mut(&merchant_id)
            .ok_or(MerchantDBError::NotFound)
    }

    // 토큰을 소비하고 그 계정을 돌려준다. 소비할 수 없으면 아무것도 바꾸지 않는다.
    fn redeem(
        &mut self,
        token: &VerificationToken,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> TokenConsumption<&mut MerchantAccount> {
        let stored = match self.tokens.get_mut(token.as_ref()) {
            Some(stored) if stored.purpose == purpose => stored,
            // 다른 용도의 토큰은 존재하지 않는 것으로 취급한다.
            _ => return TokenConsumption::NotFound,
        };

        if stored.consumed_at.is_some() {
            return TokenConsumption::AlreadyUsed;
        }
        if stored.expires_at <= now {
            return TokenConsumption::Expired;
        }
        match self.accounts.get_mut(&stored.merchant_id) {
            Some(account) => {
                stored.consumed_at = Some(now);
                TokenConsumption::Consumed(account)
            }
            None => TokenConsumption::NotFound,
        }
    }

    fn discard_unconsumed(&mut self, merchant_id: Uuid, purpose: TokenPurpose) {
        self.tokens.retain(|_, stored| {
            !(stored.merchant_id == merchant_id
                && stored.purpose == purpose
                && stored.consumed_at.is_none())
        });
    }
}

/// 프로세스 메모리에 계정을 저장하는 저장소.
/// 테스트와 데이터베이스 없는 로컬 실행에 사용한다.
/// 모든 연산은 하나의 잠금 안에서 끝나고 잠금을 쥔 채로 `.await`하지 않는다.
#[derive(Default)]
pub struct InMemoryMerchantRepository {
    store: Mutex<Store>,
}

impl InMemoryMerchantRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, MerchantDBError> {
        self.store.lock().map_err(|_| {
            MerchantDBError::StorageFailure(anyhow::anyhow!("In-memory store lock was poisoned."))
        })
    }
}

impl MerchantRepository for InMemoryMerchantRepository {
    async fn find_by_email(
        &self,
        email: &MerchantEmail,
    ) -> Result<Option<MerchantAccount>, MerchantDBError> {
        let store = self.lock()?;
        Ok(store
            .emails
            .get(email)
            .and_then(|merchant_id| store.accounts.get(merchant_id))
            .cloned())
    }

    async fn find_by_id(&self, merchant_id: Uuid) -> Result<MerchantAccount, MerchantDBError> {
        self.lock()?
            .accounts
            .get(&merchant_id)
            .cloned()
            .ok_or(MerchantDBError::NotFound)
    }

    async fn create(
        &self,
        email: &MerchantEmail,
        password_hash: Secret<String>,
        profile: &MerchantProfile,
    ) -> Result<MerchantAccount, MerchantDBError> {
        let mut store = self.lock()?;
        if store.emails.contains_key(email) {
            return Err(MerchantDBError::DuplicateEmail);
        }

        let now = Utc::now();
        let account = MerchantAccount {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash,
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            description: profile.description.clone(),
            status: AccountStatus::Unverified,
            created_at: now,
            updated_at: now,
        };
        store.emails.insert(email.clone(), account.id);
        store.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn update_password(
        &self,
        merchant_id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<(), MerchantDBError> {
        let mut store = self.lock()?;
        let account = store.account_mut(merchant_id)?;
        account.password_hash = password_hash;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_status(
        &self,
        merchant_id: Uuid,
        status: AccountStatus,
    ) -> Result<(), MerchantDBError> {
        let mut store = self.lock()?;
        let account = store.account_mut(merchant_id)?;
        account.status = status;
        account.updated_at = Utc::now();
        Ok(())
    }

    async fn update_token(&self, issued_token: &IssuedToken) -> Result<(), MerchantDBError> {
        let mut store = self.lock()?;
        if !store.accounts.contains_key(&issued_token.merchant_id) {
            return Err(MerchantDBError::NotFound);
        }
        store.discard_unconsumed(issued_token.merchant_id, issued_token.purpose);
        store.tokens.insert(
            issued_token.token.as_ref().to_string(),
            StoredToken {
                merchant_id: issued_token.merchant_id,
                purpose: issued_token.purpose,
                expires_at: issued_token.expires_at,
                consumed_at: None,
            },
        );
        Ok(())
    }

    async fn activate_with_token(
        &self,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption<MerchantAccount>, MerchantDBError> {
        let mut store = self.lock()?;
        Ok(store
            .redeem(token, TokenPurpose::EmailVerify, now)
            .map(|account| {
                if account.status == AccountStatus::Unverified {
                    account.status = AccountStatus::Active;
                    account.updated_at = now;
                }
                account.clone()
            }))
    }

    async fn reset_password_with_token(
        &self,
        token: &VerificationToken,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption, MerchantDBError> {
        let mut store = self.lock()?;
        let consumption = store
            .redeem(token, TokenPurpose::PasswordReset, now)
            .map(|account| {
                account.password_hash = password_hash;
                account.updated_at = now;
                account.id
            });
        if let TokenConsumption::Consumed(merchant_id) = consumption {
            store.discard_unconsumed(merchant_id, TokenPurpose::PasswordReset);
        }
        Ok(consumption)
    }

    async fn update_profile(
        &self,
        merchant_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<MerchantAccount, MerchantDBError> {
        let mut store = self.lock()?;
        let account = store.account_mut(merchant_id)?;
        update.apply_to(account);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }
}
