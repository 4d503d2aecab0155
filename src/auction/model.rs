use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 최소 입찰 단위 기본값 (0.01)
pub const DEFAULT_MINIMUM_INCREMENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

// region:    --- Money
/// 금액 컬럼의 소수 자릿수. 스키마의 NUMERIC(12, 2)와 같아야 한다.
pub const MONEY_SCALE: u32 = 2;

/// NUMERIC(12, 2)에 반올림 없이 저장할 수 있는 금액인지 확인
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE && amount.abs() < Decimal::new(10_000_000_000, 0)
}

// endregion: --- Money

// region:    --- Auction Status
/// 경매 상태
/// 진행 중 상태만 기록되며 상태 전이 로직은 없다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuctionStatus {
    #[default]
    #[serde(rename = "In Progress")]
    InProgress,
    Sold,
    Expired,
    Cancelled,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::InProgress => "In Progress",
            AuctionStatus::Sold => "Sold",
            AuctionStatus::Expired => "Expired",
            AuctionStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("알 수 없는 경매 상태: {0}")]
pub struct UnknownStatus(pub String);

impl TryFrom<String> for AuctionStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "In Progress" => Ok(AuctionStatus::InProgress),
            "Sold" => Ok(AuctionStatus::Sold),
            "Expired" => Ok(AuctionStatus::Expired),
            "Cancelled" => Ok(AuctionStatus::Cancelled),
            _ => Err(UnknownStatus(value)),
        }
    }
}

// endregion: --- Auction Status

// region:    --- Models
// 경매 모델
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub auction_id: i64,
    pub card_id: i64,
    pub seller_id: i64,
    pub description: String,
    pub starting_bid: Decimal,
    pub minimum_increment: Decimal,
    /// 경매 기간 (시간 단위)
    pub auction_duration: f64,
    pub image_url: String,
    #[sqlx(try_from = "String")]
    pub status: AuctionStatus,
    pub end_time: DateTime<Utc>,
    pub highest_bidder_id: Option<i64>,
    pub highest_bid: Decimal,
    pub created_at: DateTime<Utc>,
}

/// 경매 생성 정보
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionInfo {
    pub card_id: i64,
    pub description: String,
    pub starting_bid: Decimal,
    pub minimum_increment: Decimal,
    pub auction_duration: f64,
    pub image_url: String,
}

impl AuctionInfo {
    /// 생성 시각 기준 종료 시각. 표현할 수 없는 기간이면 `None`
    pub fn end_time_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if !self.auction_duration.is_finite() {
            return None;
        }
        let millis = (self.auction_duration * 3_600_000.0).round() as i64;
        chrono::Duration::try_milliseconds(millis).and_then(|d| start.checked_add_signed(d))
    }
}

/// 경매 등록 응답
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionResponse {
    pub id: i64,
    pub card_id: i64,
    pub description: String,
    pub starting_bid: Decimal,
    pub minimum_increment: Decimal,
    pub auction_duration: f64,
    pub image_url: String,
}

impl From<Auction> for AuctionResponse {
    fn from(auction: Auction) -> Self {
        Self {
            id: auction.auction_id,
            card_id: auction.card_id,
            description: auction.description,
            starting_bid: auction.starting_bid,
            minimum_increment: auction.minimum_increment,
            auction_duration: auction.auction_duration,
            image_url: auction.image_url,
        }
    }
}

// endregion: --- Models

// endregion: --- Tests
