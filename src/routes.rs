// region:    --- Imports
use crate::auth;
use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

// endregion: --- Imports

// 이미지 외 폼 필드용 여유분 (1MB)
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

// region:    --- Router
/// 전체 라우터 구성
pub fn create_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 사용자/관리자 역할이 필요한 카드 변경 라우트
    let guarded = Router::new()
        .route("/:username/cards", post(handlers::handle_add_card))
        .route("/:username/cards/:card_id", post(handlers::handle_delete_card))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_card_roles,
        ));

    // TODO: 카드 목록 조회에 역할 확인이 필요한지 결정되면 guarded로 이동
    let public = Router::new()
        .route("/:username/cards/all_cards", post(handlers::handle_read_cards))
        .route("/submit-auction", post(handlers::handle_submit_auction))
        .route("/auctions/:auction_id", get(handlers::handle_get_auction));

    let body_limit = state.images.max_bytes() + FORM_OVERHEAD_BYTES;

    Router::new()
        .merge(guarded)
        .merge(public)
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
// endregion: --- Router

// endregion: --- Tests
