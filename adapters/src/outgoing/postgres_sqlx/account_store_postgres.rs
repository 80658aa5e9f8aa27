use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{debug, instrument};
use uuid::Uuid;

use domain::{
    account::{Account, AccountId, AccountPatch},
    provider::Provider,
};
use social_accounts_application::{
    error::{AppError, AppResult},
    ports::outgoing::account_store::AccountStorePort,
};

use super::utils::PostgresExecutor;

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, avatar_url, \
     google_external_id, facebook_external_id, registration_date";

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    avatar_url: Option<String>,
    google_external_id: Option<String>,
    facebook_external_id: Option<String>,
    registration_date: OffsetDateTime,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::from_uuid(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            avatar_url: row.avatar_url,
            google_external_id: row.google_external_id,
            facebook_external_id: row.facebook_external_id,
            registration_date: row.registration_date,
        }
    }
}

fn not_found(id: &AccountId) -> AppError {
    AppError::NotFound {
        message: format!("Account {id} not found"),
    }
}

fn external_id_column(provider: Provider) -> &'static str {
    match provider {
        Provider::Google => "google_external_id",
        Provider::Facebook => "facebook_external_id",
    }
}

pub struct PostgresAccountStoreAdapter {
    pool: PgPool,
    executor: PostgresExecutor,
}

impl PostgresAccountStoreAdapter {
    pub fn new(pool: PgPool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: PostgresExecutor::new(query_timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl AccountStorePort for PostgresAccountStoreAdapter {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(email)
                        .fetch_optional(&self.pool)
                },
                "Failed to find account by email",
            )
            .await?;

        Ok(row.map(Account::from))
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(
        &self,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Option<Account>> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {} = $1",
            external_id_column(provider)
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(external_id)
                        .fetch_optional(&self.pool)
                },
                &format!("Failed to find account by {provider} external id"),
            )
            .await?;

        Ok(row.map(Account::from))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &AccountId) -> AppResult<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(id.as_uuid())
                        .fetch_optional(&self.pool)
                },
                &format!("Failed to load account {id}"),
            )
            .await?;

        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, account), fields(account_id = %account.id))]
    async fn insert(&self, account: &Account) -> AppResult<Account> {
        let query = format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(account.id.as_uuid())
                        .bind(&account.first_name)
                        .bind(&account.last_name)
                        .bind(&account.email)
                        .bind(&account.avatar_url)
                        .bind(&account.google_external_id)
                        .bind(&account.facebook_external_id)
                        .bind(account.registration_date)
                        .fetch_one(&self.pool)
                },
                "Failed to insert account",
            )
            .await?;

        debug!("Inserted account {}", account.id);
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn link_external_id(
        &self,
        id: &AccountId,
        provider: Provider,
        external_id: &str,
    ) -> AppResult<Account> {
        let column = external_id_column(provider);
        let query = format!(
            "UPDATE accounts SET {column} = $2 \
             WHERE id = $1 AND {column} IS NULL \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(id.as_uuid())
                        .bind(external_id)
                        .fetch_optional(&self.pool)
                },
                &format!("Failed to link {provider} id to account {id}"),
            )
            .await?;

        match row {
            Some(row) => Ok(row.into()),
            // Slot already filled (or account gone): report what is stored.
            None => self.find_by_id(id).await?.ok_or_else(|| not_found(id)),
        }
    }

    #[instrument(skip(self, patch))]
    async fn update_attributes(&self, id: &AccountId, patch: &AccountPatch) -> AppResult<Account> {
        let query = format!(
            "UPDATE accounts SET first_name = COALESCE($2, first_name), \
             last_name = COALESCE($3, last_name), email = COALESCE($4, email) \
             WHERE id = $1 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(id.as_uuid())
                        .bind(&patch.first_name)
                        .bind(&patch.last_name)
                        .bind(&patch.email)
                        .fetch_optional(&self.pool)
                },
                &format!("Failed to update account {id}"),
            )
            .await?;

        row.map(Account::from).ok_or_else(|| not_found(id))
    }

    #[instrument(skip(self))]
    async fn update_avatar_url(&self, id: &AccountId, avatar_url: &str) -> AppResult<Account> {
        let query = format!(
            "UPDATE accounts SET avatar_url = $2 WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, AccountRow>(&query)
                        .bind(id.as_uuid())
                        .bind(avatar_url)
                        .fetch_optional(&self.pool)
                },
                &format!("Failed to update avatar of account {id}"),
            )
            .await?;

        row.map(Account::from).ok_or_else(|| not_found(id))
    }
}
