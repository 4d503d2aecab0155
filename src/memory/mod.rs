//! 인메모리 저장소
//! DATABASE_URL이 없을 때 사용하는 로컬 백엔드. 테이블 구조와 외래 키 규칙을
//! Postgres 스키마와 동일하게 따른다 (카드 삭제 시 경매도 함께 삭제).
// region:    --- Imports
use crate::auction::model::{Auction, AuctionInfo, AuctionStatus};
use crate::auction::service::AuctionService;
use crate::card::model::{Card, CardInfo, DeleteOutcome, Profile};
use crate::card::service::CardService;
use crate::database::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

// endregion: --- Imports

// region:    --- Memory Store
#[derive(Default)]
struct Tables {
    profiles: Vec<Profile>,
    cards: Vec<Card>,
    auctions: Vec<Auction>,
    next_user_id: i64,
    next_card_id: i64,
    next_auction_id: i64,
}

impl Tables {
    fn profile_by_username(&self, username: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.username == username)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 프로필 등록. 이미 있으면 기존 프로필 반환
    pub async fn insert_profile(&self, username: &str) -> Profile {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.profile_by_username(username) {
            return existing.clone();
        }
        tables.next_user_id += 1;
        let profile = Profile {
            user_id: tables.next_user_id,
            username: username.to_string(),
        };
        tables.profiles.push(profile.clone());
        profile
    }

    /// 카드 ID로 카드 조회
    pub async fn get_card(&self, card_id: i64) -> Option<Card> {
        let tables = self.tables.read().await;
        tables.cards.iter().find(|c| c.card_id == card_id).cloned()
    }

    pub async fn auction_count(&self) -> usize {
        self.tables.read().await.auctions.len()
    }
}

#[async_trait]
impl CardService for MemoryStore {
    async fn get_cards_by_username(&self, username: &str) -> Result<Option<Vec<Card>>, StoreError> {
        info!("{:<12} --> 카드 목록 조회 username: {}", "Memory", username);
        let tables = self.tables.read().await;
        let Some(profile) = tables.profile_by_username(username) else {
            return Ok(None);
        };
        let cards = tables
            .cards
            .iter()
            .filter(|c| c.owner_id == profile.user_id)
            .cloned()
            .collect();
        Ok(Some(cards))
    }

    async fn add_card(&self, username: &str, card_info: CardInfo) -> Result<Option<Card>, StoreError> {
        info!("{:<12} --> 카드 추가 username: {}", "Memory", username);
        let mut tables = self.tables.write().await;
        let Some(owner_id) = tables.profile_by_username(username).map(|p| p.user_id) else {
            return Ok(None);
        };
        tables.next_card_id += 1;
        let card = Card {
            card_id: tables.next_card_id,
            owner_id,
            name: card_info.name,
            description: card_info.description,
            image_url: card_info.image_url,
            created_at: Utc::now(),
        };
        tables.cards.push(card.clone());
        Ok(Some(card))
    }

    async fn delete_card(&self, card_id: i64, username: &str) -> Result<DeleteOutcome, StoreError> {
        info!(
            "{:<12} --> 카드 삭제 card_id: {}, username: {}",
            "Memory", card_id, username
        );
        let mut tables = self.tables.write().await;
        let Some(owner_id) = tables.profile_by_username(username).map(|p| p.user_id) else {
            return Ok(DeleteOutcome::Unauthenticated);
        };

        let Some(position) = tables.cards.iter().position(|c| c.card_id == card_id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if tables.cards[position].owner_id != owner_id {
            return Ok(DeleteOutcome::Forbidden);
        }

        tables.cards.remove(position);
        tables.auctions.retain(|a| a.card_id != card_id);
        Ok(DeleteOutcome::Deleted)
    }
}

#[async_trait]
impl AuctionService for MemoryStore {
    async fn create_auction(&self, auction_info: AuctionInfo) -> Result<Option<Auction>, StoreError> {
        info!(
            "{:<12} --> 경매 등록 card_id: {}",
            "Memory", auction_info.card_id
        );
        let now = Utc::now();
        let Some(end_time) = auction_info.end_time_from(now) else {
            return Ok(None);
        };

        let mut tables = self.tables.write().await;
        let Some(seller_id) = tables
            .cards
            .iter()
            .find(|c| c.card_id == auction_info.card_id)
            .map(|c| c.owner_id)
        else {
            return Ok(None);
        };

        tables.next_auction_id += 1;
        let auction = Auction {
            auction_id: tables.next_auction_id,
            card_id: auction_info.card_id,
            seller_id,
            description: auction_info.description,
            starting_bid: auction_info.starting_bid,
            minimum_increment: auction_info.minimum_increment,
            auction_duration: auction_info.auction_duration,
            image_url: auction_info.image_url,
            status: AuctionStatus::InProgress,
            end_time,
            highest_bidder_id: None,
            highest_bid: auction_info.starting_bid,
            created_at: now,
        };
        tables.auctions.push(auction.clone());
        Ok(Some(auction))
    }

    async fn get_auction(&self, auction_id: i64) -> Result<Option<Auction>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .auctions
            .iter()
            .find(|a| a.auction_id == auction_id)
            .cloned())
    }
}
// endregion: --- Memory Store

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::DEFAULT_MINIMUM_INCREMENT;
    use rust_decimal::Decimal;

    fn card_info(name: &str) -> CardInfo {
        CardInfo {
            name: name.to_string(),
            description: Some("1st edition".to_string()),
            image_url: None,
        }
    }

    fn auction_info(card_id: i64) -> AuctionInfo {
        AuctionInfo {
            card_id,
            description: "mint condition".to_string(),
            starting_bid: Decimal::new(1000, 2),
            minimum_increment: DEFAULT_MINIMUM_INCREMENT,
            auction_duration: 24.0,
            image_url: "/static/images/card.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let store = MemoryStore::new();
        assert!(store.get_cards_by_username("ghost").await.unwrap().is_none());
        assert!(store.add_card("ghost", card_info("Pikachu")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_added_card_is_listed() {
        let store = MemoryStore::new();
        let profile = store.insert_profile("ash").await;

        let card = store.add_card("ash", card_info("Pikachu")).await.unwrap().unwrap();
        assert_eq!(card.owner_id, profile.user_id);

        let cards = store.get_cards_by_username("ash").await.unwrap().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card_id, card.card_id);
        assert_eq!(cards[0].name, "Pikachu");
    }

    #[tokio::test]
    async fn test_known_user_without_cards_gets_empty_list() {
        let store = MemoryStore::new();
        store.insert_profile("misty").await;
        let cards = store.get_cards_by_username("misty").await.unwrap();
        assert_eq!(cards.map(|c| c.len()), Some(0));
    }

    #[tokio::test]
    async fn test_delete_outcomes() {
        let store = MemoryStore::new();
        store.insert_profile("ash").await;
        store.insert_profile("gary").await;
        let card = store.add_card("ash", card_info("Pikachu")).await.unwrap().unwrap();

        assert_eq!(
            store.delete_card(card.card_id, "nobody").await.unwrap(),
            DeleteOutcome::Unauthenticated
        );
        assert_eq!(
            store.delete_card(card.card_id, "gary").await.unwrap(),
            DeleteOutcome::Forbidden
        );
        assert!(store.get_card(card.card_id).await.is_some());
        assert_eq!(store.delete_card(999, "ash").await.unwrap(), DeleteOutcome::NotFound);
        assert_eq!(
            store.delete_card(card.card_id, "ash").await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert!(store.get_card(card.card_id).await.is_none());
        assert_eq!(
            store.delete_card(card.card_id, "ash").await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_create_auction_uses_card_owner_as_seller() {
        let store = MemoryStore::new();
        let profile = store.insert_profile("ash").await;
        let card = store.add_card("ash", card_info("Charizard")).await.unwrap().unwrap();

        let auction = store.create_auction(auction_info(card.card_id)).await.unwrap().unwrap();
        assert_eq!(auction.seller_id, profile.user_id);
        assert_eq!(auction.status, AuctionStatus::InProgress);
        assert_eq!(auction.highest_bid, auction.starting_bid);
        assert!(auction.highest_bidder_id.is_none());
        assert!(auction.end_time > auction.created_at);

        let fetched = store.get_auction(auction.auction_id).await.unwrap().unwrap();
        assert_eq!(fetched.description, "mint condition");
    }

    #[tokio::test]
    async fn test_create_auction_for_missing_card() {
        let store = MemoryStore::new();
        assert!(store.create_auction(auction_info(42)).await.unwrap().is_none());
        assert_eq!(store.auction_count().await, 0);
    }

    #[tokio::test]
    async fn test_deleting_card_removes_its_auctions() {
        let store = MemoryStore::new();
        store.insert_profile("ash").await;
        let card = store.add_card("ash", card_info("Mew")).await.unwrap().unwrap();
        store.create_auction(auction_info(card.card_id)).await.unwrap().unwrap();
        assert_eq!(store.auction_count().await, 1);

        store.delete_card(card.card_id, "ash").await.unwrap();
        assert_eq!(store.auction_count().await, 0);
    }
}
// endregion: --- Tests
