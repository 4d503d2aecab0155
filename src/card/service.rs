//! 카드 관련 서비스
//! 1. 사용자 카드 목록 조회
//! 2. 카드 추가
//! 3. 소유자 확인 후 카드 삭제
// region:    --- Imports
use super::model::{Card, CardInfo, DeleteOutcome, Profile};
use crate::database::{DatabaseManager, StoreError};
use crate::query::queries;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Card Service Trait
/// 카드 서비스 트레이트
#[async_trait]
pub trait CardService: Send + Sync {
    /// 사용자가 소유한 모든 카드. 사용자가 없으면 `None`
    async fn get_cards_by_username(&self, username: &str) -> Result<Option<Vec<Card>>, StoreError>;

    /// 사용자에게 새 카드 추가. 사용자가 없으면 `None`
    async fn add_card(&self, username: &str, card_info: CardInfo) -> Result<Option<Card>, StoreError>;

    /// 소유자 확인 후 카드 삭제
    async fn delete_card(&self, card_id: i64, username: &str) -> Result<DeleteOutcome, StoreError>;
}

// endregion: --- Card Service Trait

// region:    --- Postgres Card Service
/// 카드 서비스 구현체
pub struct PostgresCardService {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresCardService {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl CardService for PostgresCardService {
    async fn get_cards_by_username(&self, username: &str) -> Result<Option<Vec<Card>>, StoreError> {
        info!("{:<12} --> 카드 목록 조회 username: {}", "Query", username);
        let username = username.to_owned();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let profile = sqlx::query_as::<_, Profile>(queries::GET_PROFILE_BY_USERNAME)
                        .bind(&username)
                        .fetch_optional(&mut **tx)
                        .await?;
                    let Some(profile) = profile else {
                        return Ok(None);
                    };

                    let cards = sqlx::query_as::<_, Card>(queries::GET_CARDS_BY_OWNER)
                        .bind(profile.user_id)
                        .fetch_all(&mut **tx)
                        .await?;
                    Ok(Some(cards))
                })
            })
            .await
    }

    async fn add_card(&self, username: &str, card_info: CardInfo) -> Result<Option<Card>, StoreError> {
        info!("{:<12} --> 카드 추가 username: {}", "Command", username);
        let username = username.to_owned();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let profile = sqlx::query_as::<_, Profile>(queries::GET_PROFILE_BY_USERNAME)
                        .bind(&username)
                        .fetch_optional(&mut **tx)
                        .await?;
                    let Some(profile) = profile else {
                        return Ok(None);
                    };

                    let card = sqlx::query_as::<_, Card>(queries::INSERT_CARD)
                        .bind(profile.user_id)
                        .bind(&card_info.name)
                        .bind(&card_info.description)
                        .bind(&card_info.image_url)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(Some(card))
                })
            })
            .await
    }

    async fn delete_card(&self, card_id: i64, username: &str) -> Result<DeleteOutcome, StoreError> {
        info!(
            "{:<12} --> 카드 삭제 card_id: {}, username: {}",
            "Command", card_id, username
        );
        let username = username.to_owned();
        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let profile = sqlx::query_as::<_, Profile>(queries::GET_PROFILE_BY_USERNAME)
                        .bind(&username)
                        .fetch_optional(&mut **tx)
                        .await?;
                    let Some(profile) = profile else {
                        return Ok(DeleteOutcome::Unauthenticated);
                    };

                    // 소유자 조건으로 바로 삭제하고, 삭제된 행이 없을 때만 원인 확인
                    let deleted = sqlx::query_scalar::<_, i64>(queries::DELETE_OWNED_CARD)
                        .bind(card_id)
                        .bind(profile.user_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if deleted.is_some() {
                        return Ok(DeleteOutcome::Deleted);
                    }

                    let exists = sqlx::query_scalar::<_, bool>(queries::CARD_EXISTS)
                        .bind(card_id)
                        .fetch_one(&mut **tx)
                        .await?;
                    if exists {
                        Ok(DeleteOutcome::Forbidden)
                    } else {
                        Ok(DeleteOutcome::NotFound)
                    }
                })
            })
            .await
    }
}
// endregion: --- Postgres Card Service
