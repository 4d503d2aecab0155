// region:    --- Imports
use super::model::{Auction, AuctionInfo, AuctionStatus};
use crate::card::model::Card;
use crate::database::{DatabaseManager, StoreError};
use crate::query::queries;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Auction Service Trait
/// 경매 서비스 트레이트
#[async_trait]
pub trait AuctionService: Send + Sync {
    /// 경매 등록. 카드가 없거나 종료 시각을 계산할 수 없으면 `None`
    async fn create_auction(&self, auction_info: AuctionInfo) -> Result<Option<Auction>, StoreError>;

    /// 경매 조회
    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError>;
}

// endregion: --- Auction Service Trait

// region:    --- Postgres Auction Service
/// 경매 서비스 구현체
pub struct PostgresAuctionService {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresAuctionService {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }
}

#[async_trait]
impl AuctionService for PostgresAuctionService {
    async fn create_auction(&self, auction_info: AuctionInfo) -> Result<Option<Auction>, StoreError> {
        info!(
            "{:<12} --> 경매 등록 card_id: {}",
            "Command", auction_info.card_id
        );
        let now = Utc::now();
        let Some(end_time) = auction_info.end_time_from(now) else {
            warn!(
                "{:<12} --> 경매 종료 시각 계산 불가 duration: {}",
                "Command", auction_info.auction_duration
            );
            return Ok(None);
        };

        self.db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    let card = sqlx::query_as::<_, Card>(queries::GET_CARD)
                        .bind(auction_info.card_id)
                        .fetch_optional(&mut **tx)
                        .await?;
                    let Some(card) = card else {
                        return Ok(None);
                    };

                    // 판매자는 등록 시점의 카드 소유자
                    let auction = sqlx::query_as::<_, Auction>(queries::INSERT_AUCTION)
                        .bind(card.card_id)
                        .bind(card.owner_id)
                        .bind(&auction_info.description)
                        .bind(auction_info.starting_bid)
                        .bind(auction_info.minimum_increment)
                        .bind(auction_info.auction_duration)
                        .bind(&auction_info.image_url)
                        .bind(AuctionStatus::default().as_str())
                        .bind(end_time)
                        .bind(auction_info.starting_bid)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(Some(auction))
                })
            })
            .await
    }

    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
        let auction = sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
            .bind(auction_id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(auction)
    }
}
// endregion: --- Postgres Auction Service
