use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 프로필 모델 (외부에서 생성, 이 서비스에서는 조회만 한다)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub username: String,
}

// 카드 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    pub card_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 카드 추가 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// 카드 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardResponse {
    pub card_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<Card> for CardResponse {
    fn from(card: Card) -> Self {
        Self {
            card_id: card.card_id,
            owner_id: card.owner_id,
            name: card.name,
            description: card.description,
            image_url: card.image_url,
        }
    }
}

/// 카드 삭제 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// 요청한 사용자의 프로필이 없음
    Unauthenticated,
    /// 카드는 있지만 다른 사용자 소유
    Forbidden,
    NotFound,
}
