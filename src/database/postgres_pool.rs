use chrono::{DateTime, Utc};
use futures_util::TryFutureExt;
use secrecy::{ExposeSecret, Secret};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use uuid::Uuid;

use crate::domain::{
    AccountStatus, IssuedToken, MerchantAccount, MerchantEmail, MerchantProfile, ProfileUpdate,
    TokenConsumption, TokenPurpose, VerificationToken,
};

use super::{
    postgres_query::{
        pg_activate_merchant, pg_consume_token, pg_delete_unconsumed_tokens,
        pg_get_merchant_by_email, pg_get_merchant_by_id, pg_get_token_state, pg_insert_merchant,
        pg_insert_token, pg_update_password, pg_update_profile, pg_update_status,
        NewMerchantRecord,
    },
    MerchantDBError, MerchantRepository,
};

#[derive(Clone)]
pub struct PostgresPool {
    pool: PgPool,
}

impl AsRef<PgPool> for PostgresPool {
    fn as_ref(&self) -> &PgPool {
        // 호출자는 읽기 전용으로 접근할 수 있으며, 이는 불변량을 깨뜨리지 못한다.
        &self.pool
    }
}

impl From<PostgresPool> for PgPool {
    fn from(value: PostgresPool) -> Self {
        value.pool
    }
}

impl PostgresPool {
    #[tracing::instrument(name = "Connect to the Postgres server.", skip_all)]
    pub fn connect(pg_connect_options: PgConnectOptions) -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect_lazy_with(pg_connect_options);
        PostgresPool { pool }
    }

    // 토큰을 소비하지 못한 이유를 구분한다.
    async fn token_rejection<T>(
        &self,
        token: &VerificationToken,
        purpose: TokenPurpose,
    ) -> Result<TokenConsumption<T>, MerchantDBError> {
        let consumption = match pg_get_token_state(self.as_ref(), token.as_ref(), purpose.as_str())
            .await?
        {
            None => TokenConsumption::NotFound,
            Some(state) if state.consumed_at.is_some() => TokenConsumption::AlreadyUsed,
            Some(_) => TokenConsumption::Expired,
        };
        Ok(consumption)
    }

    #[tracing::instrument(name = "Run database migrations.", skip_all)]
    pub async fn migrate(&self) -> Result<(), MerchantDBError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| MerchantDBError::StorageFailure(e.into()))
    }
}

impl MerchantRepository for PostgresPool {
    #[tracing::instrument(name = "Find merchant by email", skip_all)]
    async fn find_by_email(
        &self,
        email: &MerchantEmail,
    ) -> Result<Option<MerchantAccount>, MerchantDBError> {
        let record = pg_get_merchant_by_email(self.as_ref(), email.as_ref())
            .await
            .map_err(|e| {
                tracing::error!("Failed to execute query: {:?}", e);
                MerchantDBError::from(e)
            })?;
        Ok(record.map(MerchantAccount::try_from).transpose()?)
    }

    #[tracing::instrument(name = "Find merchant by id", skip(self))]
    async fn find_by_id(&self, merchant_id: Uuid) -> Result<MerchantAccount, MerchantDBError> {
        let record = pg_get_merchant_by_id(self.as_ref(), merchant_id)
            .map_err(MerchantDBError::from)
            .await?
            .ok_or(MerchantDBError::NotFound)?;
        Ok(MerchantAccount::try_from(record)?)
    }

    #[tracing::instrument(name = "Saving new merchant details in the database.", skip_all)]
    async fn create(
        &self,
        email: &MerchantEmail,
        password_hash: Secret<String>,
        profile: &MerchantProfile,
    ) -> Result<MerchantAccount, MerchantDBError> {
        let new_merchant = NewMerchantRecord {
            email: email.as_ref(),
            password_hash: password_hash.expose_secret(),
            name: profile.name.as_ref(),
            phone: profile.phone.as_ref().map(AsRef::as_ref),
            address: profile.address.as_ref().map(AsRef::as_ref),
            description: profile.description.as_ref().map(AsRef::as_ref),
        };
        let record = pg_insert_merchant(self.as_ref(), new_merchant)
            .await
            .map_err(|e| {
                let e = MerchantDBError::from(e);
                if !matches!(e, MerchantDBError::DuplicateEmail) {
                    tracing::error!("Failed to execute query: {:?}", e);
                }
                e
            })?;
        Ok(MerchantAccount::try_from(record)?)
    }

    #[tracing::instrument(name = "Update password hash", skip(self, password_hash))]
    async fn update_password(
        &self,
        merchant_id: Uuid,
        password_hash: Secret<String>,
    ) -> Result<(), MerchantDBError> {
        let result = pg_update_password(
            self.as_ref(),
            merchant_id,
            password_hash.expose_secret(),
            Utc::now(),
        )
        .map_err(MerchantDBError::from)
        .await?;
        match result.rows_affected() {
            0 => Err(MerchantDBError::NotFound),
            _ => Ok(()),
        }
    }

    #[tracing::instrument(name = "Update account status", skip(self))]
    async fn update_status(
        &self,
        merchant_id: Uuid,
        status: AccountStatus,
    ) -> Result<(), MerchantDBError> {
        let result = pg_update_status(self.as_ref(), merchant_id, status)
            .map_err(MerchantDBError::from)
            .await?;
        match result.rows_affected() {
            0 => Err(MerchantDBError::NotFound),
            _ => Ok(()),
        }
    }

    #[tracing::instrument(
        name = "Store a new token",
        skip_all,
        fields(merchant_id = %issued_token.merchant_id, purpose = issued_token.purpose.as_str())
    )]
    async fn update_token(&self, issued_token: &IssuedToken) -> Result<(), MerchantDBError> {
        let mut transaction = self.pool.begin().await?;
        pg_delete_unconsumed_tokens(
            &mut *transaction,
            issued_token.merchant_id,
            issued_token.purpose.as_str(),
        )
        .await?;
        pg_insert_token(
            &mut *transaction,
            issued_token.token.as_ref(),
            issued_token.merchant_id,
            issued_token.purpose.as_str(),
            issued_token.expires_at,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to execute query: {:?}", e);
            MerchantDBError::from(e)
        })?;
        transaction.commit().await?;

        Ok(())
    }

    // 토큰 소비와 상태 변경을 하나의 트랜잭션으로 묶는다.
    #[tracing::instrument(name = "Activate merchant with a token", skip_all)]
    async fn activate_with_token(
        &self,
        token: &VerificationToken,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption<MerchantAccount>, MerchantDBError> {
        let purpose = TokenPurpose::EmailVerify;
        let mut transaction = self.pool.begin().await?;
        let Some(merchant_id) =
            pg_consume_token(&mut *transaction, token.as_ref(), purpose.as_str(), now).await?
        else {
            transaction.rollback().await?;
            return self.token_rejection(token, purpose).await;
        };

        pg_activate_merchant(&mut *transaction, merchant_id, now).await?;
        let record = pg_get_merchant_by_id(&mut *transaction, merchant_id)
            .await?
            .ok_or(MerchantDBError::NotFound)?;
        transaction.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            MerchantDBError::from(e)
        })?;

        Ok(TokenConsumption::Consumed(MerchantAccount::try_from(record)?))
    }

    // 토큰 소비, 비밀번호 변경, 남은 토큰 폐기를 하나의 트랜잭션으로 묶는다.
    #[tracing::instrument(name = "Reset password with a token", skip_all)]
    async fn reset_password_with_token(
        &self,
        token: &VerificationToken,
        password_hash: Secret<String>,
        now: DateTime<Utc>,
    ) -> Result<TokenConsumption, MerchantDBError> {
        let purpose = TokenPurpose::PasswordReset;
        let mut transaction = self.pool.begin().await?;
        let Some(merchant_id) =
            pg_consume_token(&mut *transaction, token.as_ref(), purpose.as_str(), now).await?
        else {
            transaction.rollback().await?;
            return self.token_rejection(token, purpose).await;
        };

        let result = pg_update_password(
            &mut *transaction,
            merchant_id,
            password_hash.expose_secret(),
            now,
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(MerchantDBError::NotFound);
        }
        pg_delete_unconsumed_tokens(&mut *transaction, merchant_id, purpose.as_str()).await?;
        transaction.commit().await.map_err(|e| {
            tracing::error!("Failed to commit transaction: {:?}", e);
            MerchantDBError::from(e)
        })?;

        Ok(TokenConsumption::Consumed(merchant_id))
    }

    #[tracing::instrument(name = "Update merchant profile", skip(self, update))]
    async fn update_profile(
        &self,
        merchant_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<MerchantAccount, MerchantDBError> {
        let record = pg_update_profile(self.as_ref(), merchant_id, update)
            .map_err(MerchantDBError::from)
            .await?
            .ok_or(MerchantDBError::NotFound)?;
        Ok(MerchantAccount::try_from(record)?)
    }
}
