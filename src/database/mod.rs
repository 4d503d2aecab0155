// region:    --- Imports
use crate::config::AppConfig;
use crate::query::queries::INSERT_PROFILE_IF_MISSING;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Store Error
/// 저장소 계층 에러
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("데이터베이스 오류: {0}")]
    Database(#[from] sqlx::Error),
    #[error("DATABASE_URL이 설정되지 않았습니다")]
    MissingUrl,
}

// endregion: --- Store Error

// region:    --- Database Manager
pub struct DatabaseManager {
    pub pool: Arc<PgPool>,
}

impl DatabaseManager {
    /// 데이터베이스 매니저 생성
    pub async fn new(config: &AppConfig) -> Result<Self, StoreError> {
        let database_url = config.database_url.as_deref().ok_or(StoreError::MissingUrl)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(database_url)
            .await?;
        info!(
            "{:<12} --> 커넥션 풀 생성 (max_connections: {})",
            "Database", config.max_connections
        );
        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// 트랜잭션 실행
    pub async fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: for<'c> FnOnce(
            &'c mut sqlx::Transaction<'_, sqlx::Postgres>,
        ) -> Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'c>>,
        E: From<sqlx::Error>,
    {
        let mut tx = self.pool.begin().await?;
        let result = f(&mut tx).await;
        match result {
            Ok(r) => {
                tx.commit().await?;
                Ok(r)
            }
            Err(e) => {
                // 롤백 실패는 기록만 하고 원래 에러를 돌려준다
                if let Err(rollback_err) = tx.rollback().await {
                    error!("{:<12} --> 롤백 실패: {}", "Database", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// 스키마 초기화 (이미 존재하는 테이블은 유지)
    pub async fn initialize_database(&self) -> Result<(), sqlx::Error> {
        let create_schema_sql = include_str!("../sql/01-create-schema.sql");
        self.execute_multi_query(create_schema_sql).await
    }

    /// 설정된 프로필 생성 (이미 있으면 건너뜀)
    pub async fn seed_profiles(&self, usernames: &[String]) -> Result<(), sqlx::Error> {
        for username in usernames {
            sqlx::query(INSERT_PROFILE_IF_MISSING)
                .bind(username)
                .execute(&*self.pool)
                .await?;
        }
        if !usernames.is_empty() {
            info!("{:<12} --> 프로필 시드 적용: {}", "Database", usernames.join(", "));
        }
        Ok(())
    }

    /// 여러 쿼리 실행
    async fn execute_multi_query(&self, sql: &str) -> Result<(), sqlx::Error> {
        for query in sql.split(';') {
            let query = query.trim();
            if !query.is_empty() {
                sqlx::query(query).execute(&*self.pool).await?;
            }
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
// endregion: --- Database Manager
