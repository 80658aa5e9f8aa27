use social_accounts_application::error::{AppError, AppResult};
use sqlx::PgPool;
use std::{future::Future, time::Duration};
use tokio::time::timeout;

pub struct PostgresExecutor {
    timeout_secs: u64,
}

impl PostgresExecutor {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub async fn execute_with_timeout<T, F, Fut>(
        &self,
        operation: F,
        error_context: &str,
    ) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        timeout(Duration::from_secs(self.timeout_secs), operation())
            .await
            .map_err(|_| AppError::DatabaseError {
                message: "DB timeout".to_string(),
            })?
            .map_err(|e| map_sqlx_error(&e, error_context))
    }
}

/// Unique violations become `Conflict` so callers can re-read committed state.
fn map_sqlx_error(error: &sqlx::Error, error_context: &str) -> AppError {
    match error {
        sqlx::Error::Database(db_error) if db_error.is_unique_violation() => AppError::Conflict {
            message: format!(
                "{}: {} already in use",
                error_context,
                db_error.constraint().unwrap_or("unique key")
            ),
        },
        _ => AppError::DatabaseError {
            message: format!("{}: {}", error_context, error),
        },
    }
}

pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::DatabaseError {
            message: format!("Failed to run migrations: {}", e),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_queries_time_out() {
        let executor = PostgresExecutor::new(0);

        let result: AppResult<()> = executor
            .execute_with_timeout(
                || async {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    Ok(())
                },
                "sleep",
            )
            .await;

        assert!(matches!(result, Err(AppError::DatabaseError { .. })));
    }

    #[tokio::test]
    async fn driver_errors_carry_the_context() {
        let executor = PostgresExecutor::new(1);

        let result: AppResult<()> = executor
            .execute_with_timeout(|| async { Err(sqlx::Error::RowNotFound) }, "load account")
            .await;

        assert!(matches!(
            result,
            Err(AppError::DatabaseError { message }) if message.starts_with("load account")
        ));
    }
}
