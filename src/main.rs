// region:    --- Imports
use card_market::config::AppConfig;
use card_market::routes::create_router;
use card_market::state::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 읽기
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{:<12} --> 설정 오류: {}", "Main", e);
            return Err(e.into());
        }
    };

    // 저장소 및 공유 상태 생성
    let state = match AppState::from_config(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("{:<12} --> 저장소 초기화 실패: {:?}", "Main", e);
            return Err(e.into());
        }
    };

    // 이미지 저장 디렉터리 생성
    state.images.ensure_dir().await?;
    info!(
        "{:<12} --> 이미지 디렉터리: {}",
        "Main",
        state.images.image_dir().display()
    );

    // 라우터 설정
    let routes_all = create_router(state, &config.static_dir);

    // 리스너 생성
    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
