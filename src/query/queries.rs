// region:    --- Profile Queries
/// 사용자 이름으로 프로필 조회
pub const GET_PROFILE_BY_USERNAME: &str =
    "SELECT user_id, username FROM profiles WHERE username = $1";

/// 프로필이 없을 때만 추가
pub const INSERT_PROFILE_IF_MISSING: &str =
    "INSERT INTO profiles (username) VALUES ($1) ON CONFLICT (username) DO NOTHING";

// endregion: --- Profile Queries

// region:    --- Card Queries
/// 소유자의 모든 카드 조회
pub const GET_CARDS_BY_OWNER: &str = r#"
    SELECT card_id, owner_id, name, description, image_url, created_at
    FROM cards
    WHERE owner_id = $1
    ORDER BY card_id
"#;

/// 카드 조회
pub const GET_CARD: &str =
    "SELECT card_id, owner_id, name, description, image_url, created_at FROM cards WHERE card_id = $1";

/// 카드 추가
pub const INSERT_CARD: &str = r#"
    INSERT INTO cards (owner_id, name, description, image_url)
    VALUES ($1, $2, $3, $4)
    RETURNING card_id, owner_id, name, description, image_url, created_at
"#;

/// 소유자 조건을 포함한 카드 삭제
pub const DELETE_OWNED_CARD: &str =
    "DELETE FROM cards WHERE card_id = $1 AND owner_id = $2 RETURNING card_id";

/// 카드 존재 여부 확인
pub const CARD_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM cards WHERE card_id = $1)";

// endregion: --- Card Queries

// region:    --- Auction Queries
/// 경매 등록
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (
        card_id, seller_id, description, starting_bid, minimum_increment,
        auction_duration, image_url, status, end_time, highest_bid
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
    RETURNING auction_id, card_id, seller_id, description, starting_bid, minimum_increment,
        auction_duration, image_url, status, end_time, highest_bidder_id, highest_bid, created_at
"#;

/// 경매 조회
pub const GET_AUCTION: &str = r#"
    SELECT auction_id, card_id, seller_id, description, starting_bid, minimum_increment,
        auction_duration, image_url, status, end_time, highest_bidder_id, highest_bid, created_at
    FROM auctions
    WHERE auction_id = $1
"#;

// endregion: --- Auction Queries
