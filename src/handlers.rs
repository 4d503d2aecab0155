// region:    --- Imports
use crate::auction::model::{
    is_storable_amount, AuctionInfo, AuctionResponse, DEFAULT_MINIMUM_INCREMENT, MONEY_SCALE,
};
use crate::card::model::{CardInfo, CardResponse, DeleteOutcome};
use crate::error::AppError;
use crate::state::AppState;
use crate::upload::{ImageStore, StagedImage};
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Card Handlers

/// 카드 추가
pub async fn handle_add_card(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(card_info): Json<CardInfo>,
) -> Result<impl IntoResponse, AppError> {
    info!("{:<12} --> 카드 추가 요청 username: {}", "Handler", username);
    match state.cards.add_card(&username, card_info).await? {
        Some(card) => Ok((StatusCode::CREATED, Json(CardResponse::from(card)))),
        None => Err(AppError::NotFound(format!(
            "Username {} does not exist, cannot add card",
            username
        ))),
    }
}

/// 카드 삭제
pub async fn handle_delete_card(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path((username, card_id)) = path?;
    info!(
        "{:<12} --> 카드 삭제 요청 card_id: {}, username: {}",
        "Handler", card_id, username
    );
    match state.cards.delete_card(card_id, &username).await? {
        DeleteOutcome::Deleted => Ok(Json(serde_json::json!({
            "message": format!(
                "Card ID {} belonging to user {} deleted successfully",
                card_id, username
            )
        }))),
        DeleteOutcome::Unauthenticated => {
            Err(AppError::Unauthenticated("User not logged in".to_string()))
        }
        DeleteOutcome::Forbidden => Err(AppError::Forbidden(format!(
            "Card ID {} does not belong to user, cannot delete",
            card_id
        ))),
        DeleteOutcome::NotFound => Err(AppError::NotFound(format!(
            "Card ID {} not available",
            card_id
        ))),
    }
}

/// 사용자 카드 목록 조회
pub async fn handle_read_cards(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    info!("{:<12} --> 카드 목록 조회 username: {}", "Handler", username);
    match state.cards.get_cards_by_username(&username).await? {
        Some(cards) => Ok(Json(
            cards.into_iter().map(CardResponse::from).collect::<Vec<_>>(),
        )),
        None => Err(AppError::NotFound(format!(
            "User {} does not exist!",
            username
        ))),
    }
}

// endregion: --- Card Handlers

// region:    --- Auction Handlers

/// 경매 등록 폼 필드
struct SubmitAuctionForm {
    card_id: i64,
    description: String,
    starting_bid: Decimal,
    minimum_increment: Decimal,
    auction_duration: f64,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation(err.body_text())
    } else {
        AppError::Unprocessable(err.body_text())
    }
}

fn required<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, AppError> {
    fields
        .get(name)
        .map(|value| value.as_str())
        .ok_or_else(|| AppError::Unprocessable(format!("Field required: {}", name)))
}

fn parse_field<T: FromStr>(fields: &HashMap<String, String>, name: &str) -> Result<T, AppError> {
    required(fields, name)?
        .trim()
        .parse()
        .map_err(|_| AppError::Unprocessable(format!("Invalid value for field: {}", name)))
}

/// 멀티파트 본문 읽기. 이미지 파트는 읽는 즉시 임시 파일로 스트리밍한다.
/// 실패하면 임시 파일은 삭제된다.
async fn read_submission(
    images: &ImageStore,
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, StagedImage), AppError> {
    let mut fields = HashMap::new();
    let mut staged = None;

    match read_parts(images, &mut multipart, &mut fields, &mut staged).await {
        Ok(()) => match staged {
            Some(image) => Ok((fields, image)),
            None => Err(AppError::Unprocessable("Field required: file".to_string())),
        },
        Err(e) => {
            if let Some(image) = staged {
                image.discard().await;
            }
            Err(e)
        }
    }
}

async fn read_parts(
    images: &ImageStore,
    multipart: &mut Multipart,
    fields: &mut HashMap<String, String>,
    staged: &mut Option<StagedImage>,
) -> Result<(), AppError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "file" {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, value);
            continue;
        }

        // 같은 이름의 파트가 다시 오면 마지막 것만 사용
        if let Some(previous) = staged.take() {
            previous.discard().await;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let image = staged.insert(images.stage(&filename).await?);
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            image.write_chunk(&chunk).await?;
        }
    }
    Ok(())
}

impl SubmitAuctionForm {
    fn from_fields(fields: &HashMap<String, String>) -> Result<Self, AppError> {
        let minimum_increment = match fields.get("minimum_increment") {
            Some(_) => parse_field(fields, "minimum_increment")?,
            None => DEFAULT_MINIMUM_INCREMENT,
        };

        Ok(Self {
            card_id: parse_field(fields, "card_id")?,
            description: required(fields, "description")?.to_string(),
            starting_bid: parse_field(fields, "starting_bid")?,
            minimum_increment,
            auction_duration: parse_field(fields, "auction_duration")?,
        })
    }

    /// 경매 파라미터 검증 후 금액을 저장 정밀도로 맞춘다
    fn validate(mut self) -> Result<Self, AppError> {
        if self.starting_bid <= Decimal::ZERO {
            return Err(AppError::Validation(
                "Minimum starting bid must be greater than $0".to_string(),
            ));
        }
        if !is_storable_amount(self.starting_bid) {
            return Err(AppError::Validation(
                "Starting bid must have at most 2 decimal places and be less than 10000000000"
                    .to_string(),
            ));
        }
        if self.minimum_increment < DEFAULT_MINIMUM_INCREMENT {
            return Err(AppError::Validation(
                "Minimum increment must be at least 0.01".to_string(),
            ));
        }
        if !is_storable_amount(self.minimum_increment) {
            return Err(AppError::Validation(
                "Minimum increment must have at most 2 decimal places and be less than 10000000000"
                    .to_string(),
            ));
        }
        if self.auction_duration.is_nan() || self.auction_duration <= 0.0 {
            return Err(AppError::Validation(
                "Auction duration must be greater than 0 hours".to_string(),
            ));
        }

        self.starting_bid.rescale(MONEY_SCALE);
        self.minimum_increment.rescale(MONEY_SCALE);
        Ok(self)
    }
}

/// 경매 등록 (이미지 업로드 포함)
pub async fn handle_submit_auction(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (fields, staged) = read_submission(&state.images, multipart).await?;

    let form = match SubmitAuctionForm::from_fields(&fields).and_then(SubmitAuctionForm::validate) {
        Ok(form) => form,
        Err(e) => {
            staged.discard().await;
            return Err(e);
        }
    };
    info!(
        "{:<12} --> 경매 등록 요청 card_id: {}, file: {}",
        "Handler",
        form.card_id,
        staged.original_name()
    );

    let stored = state.images.commit(staged).await?;

    let auction_info = AuctionInfo {
        card_id: form.card_id,
        description: form.description,
        starting_bid: form.starting_bid,
        minimum_increment: form.minimum_increment,
        auction_duration: form.auction_duration,
        image_url: stored.url.clone(),
    };

    match state.auctions.create_auction(auction_info).await {
        Ok(Some(auction)) => {
            info!(
                "{:<12} --> 경매 등록 완료 id: {}",
                "Handler", auction.auction_id
            );
            Ok((StatusCode::CREATED, Json(AuctionResponse::from(auction))))
        }
        Ok(None) => {
            state.images.remove(&stored).await;
            Err(AppError::CreationFailure("Failed to create auction".to_string()))
        }
        Err(e) => {
            error!("{:<12} --> Failed to create auction: {}", "Handler", e);
            state.images.remove(&stored).await;
            Err(AppError::Internal(format!("Failed to create auction: {}", e)))
        }
    }
}

/// 경매 조회
pub async fn handle_get_auction(
    State(state): State<AppState>,
    auction_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(auction_id) = auction_id?;
    info!("{:<12} --> 경매 조회 id: {}", "Handler", auction_id);
    state
        .auctions
        .get_auction(auction_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Auction ID {} not available", auction_id)))
}

// endregion: --- Auction Handlers
