//! Postgres 연동 테스트
//! DATABASE_URL이 가리키는 데이터베이스가 필요하다: `cargo test -- --ignored`
use card_market::config::AppConfig;
use card_market::database::DatabaseManager;
use card_market::routes::create_router;
use card_market::state::AppState;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tracing::info;

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

struct TestServer {
    base_url: String,
    db_manager: Arc<DatabaseManager>,
    static_dir: TempDir,
}

/// 임의 포트로 서버 실행
async fn setup() -> TestServer {
    init_tracing();
    let static_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        static_dir: static_dir.path().to_path_buf(),
        ..AppConfig::from_env().expect("설정 읽기 실패")
    };
    assert!(config.database_url.is_some(), "DATABASE_URL must be set");

    let state = AppState::from_config(&config).await.unwrap();
    state.images.ensure_dir().await.unwrap();
    let router = create_router(state, &config.static_dir);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        db_manager: Arc::new(DatabaseManager::new(&config).await.unwrap()),
        static_dir,
    }
}

/// 테스트용 프로필 생성 (중복 방지를 위해 uuid 접미사 사용)
async fn create_test_profile(db_manager: &DatabaseManager, prefix: &str) -> (i64, String) {
    let username = format!("{}-{}", prefix, uuid::Uuid::new_v4().simple());
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO profiles (username) VALUES ($1) RETURNING user_id",
    )
    .bind(&username)
    .fetch_one(db_manager.pool())
    .await
    .unwrap();
    (user_id, username)
}

async fn add_card(client: &Client, server: &TestServer, username: &str) -> i64 {
    let response = client
        .post(format!("{}/{}/cards", server.base_url, username))
        .header("x-user-roles", "user,admin")
        .json(&json!({ "name": "Lugia", "description": "Neo Genesis" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["card_id"].as_i64().unwrap()
}

/// 카드 추가/조회/삭제 테스트
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_card_lifecycle() {
    let server = setup().await;
    let client = Client::new();
    let (owner_id, owner) = create_test_profile(&server.db_manager, "owner").await;
    let (_, other) = create_test_profile(&server.db_manager, "other").await;

    let card_id = add_card(&client, &server, &owner).await;

    let cards: Value = client
        .post(format!("{}/{}/cards/all_cards", server.base_url, owner))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cards[0]["card_id"], card_id);
    assert_eq!(cards[0]["owner_id"], owner_id);

    // 다른 사용자의 삭제 시도
    let response = client
        .post(format!("{}/{}/cards/{}", server.base_url, other, card_id))
        .header("x-user-roles", "user,admin")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 소유자 삭제
    let response = client
        .post(format!("{}/{}/cards/{}", server.base_url, owner, card_id))
        .header("x-user-roles", "user,admin")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .post(format!("{}/{}/cards/{}", server.base_url, owner, card_id))
        .header("x-user-roles", "user,admin")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// 동시 삭제 테스트: 하나만 성공해야 한다
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_concurrent_delete() {
    let server = setup().await;
    let (_, owner) = create_test_profile(&server.db_manager, "racer").await;
    let card_id = add_card(&Client::new(), &server, &owner).await;

    let mut handles = vec![];
    for _ in 0..5 {
        let url = format!("{}/{}/cards/{}", server.base_url, owner, card_id);
        handles.push(tokio::spawn(async move {
            Client::new()
                .post(url)
                .header("x-user-roles", "user,admin")
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut deleted = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::OK {
            deleted += 1;
        } else {
            assert_eq!(status, StatusCode::NOT_FOUND);
        }
    }
    info!("동시 삭제 성공 수: {}", deleted);
    assert_eq!(deleted, 1);
}

/// 경매 등록 테스트
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_submit_auction() {
    let server = setup().await;
    let client = Client::new();
    let (seller_id, seller) = create_test_profile(&server.db_manager, "seller").await;
    let card_id = add_card(&client, &server, &seller).await;

    let form = Form::new()
        .text("card_id", card_id.to_string())
        .text("description", "Lugia 1st edition")
        .text("starting_bid", "99.99")
        .text("minimum_increment", "1.00")
        .text("auction_duration", "72")
        .part(
            "file",
            Part::bytes(b"GIF89a-test".to_vec()).file_name("lugia.gif"),
        );

    let response = client
        .post(format!("{}/submit-auction", server.base_url))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();

    let image_url = body["image_url"].as_str().unwrap();
    let filename = image_url.strip_prefix("/static/images/").unwrap();
    assert!(server.static_dir.path().join("images").join(filename).exists());

    // 저장된 경매 행 확인
    let (stored_seller, status, starting_bid): (i64, String, rust_decimal::Decimal) = sqlx::query_as(
        "SELECT seller_id, status, starting_bid FROM auctions WHERE auction_id = $1",
    )
    .bind(body["id"].as_i64().unwrap())
    .fetch_one(server.db_manager.pool())
    .await
    .unwrap();
    assert_eq!(stored_seller, seller_id);
    assert_eq!(status, "In Progress");
    assert_eq!(starting_bid.to_string(), "99.99");
}

fn auction_form(card_id: i64, starting_bid: &str) -> Form {
    Form::new()
        .text("card_id", card_id.to_string())
        .text("description", "Ho-Oh promo")
        .text("starting_bid", starting_bid.to_string())
        .text("auction_duration", "24")
        .part(
            "file",
            Part::bytes(b"\x89PNG-test".to_vec()).file_name("hooh.png"),
        )
}

/// 금액은 반올림 없이 저장되고, 저장할 수 없는 정밀도는 거부된다
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_auction_amount_precision() {
    let server = setup().await;
    let client = Client::new();
    let (_, seller) = create_test_profile(&server.db_manager, "precise").await;
    let card_id = add_card(&client, &server, &seller).await;

    let response = client
        .post(format!("{}/submit-auction", server.base_url))
        .multipart(auction_form(card_id, "0.004"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        std::fs::read_dir(server.static_dir.path().join("images"))
            .unwrap()
            .count(),
        0
    );

    let response = client
        .post(format!("{}/submit-auction", server.base_url))
        .multipart(auction_form(card_id, "0.05"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["starting_bid"], "0.05");
    assert_eq!(body["minimum_increment"], "0.01");

    let (starting_bid, highest_bid): (rust_decimal::Decimal, rust_decimal::Decimal) =
        sqlx::query_as("SELECT starting_bid, highest_bid FROM auctions WHERE auction_id = $1")
            .bind(body["id"].as_i64().unwrap())
            .fetch_one(server.db_manager.pool())
            .await
            .unwrap();
    assert_eq!(starting_bid.to_string(), "0.05");
    assert_eq!(highest_bid, starting_bid);
}

/// SEED_PROFILES에 있는 프로필은 시작 시 한 번만 생성된다
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_seed_profiles_are_idempotent() {
    init_tracing();
    let username = format!("seed-{}", uuid::Uuid::new_v4().simple());
    let config = AppConfig {
        seed_profiles: vec![username.clone()],
        ..AppConfig::from_env().expect("설정 읽기 실패")
    };

    let state = AppState::from_config(&config).await.unwrap();
    AppState::from_config(&config).await.unwrap();

    let cards = state.cards.get_cards_by_username(&username).await.unwrap();
    assert_eq!(cards.map(|cards| cards.len()), Some(0));

    let db_manager = DatabaseManager::new(&config).await.unwrap();
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE username = $1")
        .bind(&username)
        .fetch_one(db_manager.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[derive(Debug, thiserror::Error)]
enum TxError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error("작업 중단")]
    Aborted,
}

/// 롤백이 실패해도 작업의 원래 에러가 반환된다
#[tokio::test]
#[ignore = "DATABASE_URL 필요"]
async fn test_transaction_keeps_original_error_when_rollback_fails() {
    init_tracing();
    let config = AppConfig::from_env().expect("설정 읽기 실패");
    let db_manager = DatabaseManager::new(&config).await.unwrap();

    let result: Result<(), TxError> = db_manager
        .transaction(|tx| {
            Box::pin(async move {
                // 자기 연결을 끊어서 이후 ROLLBACK이 실패하게 만든다
                let _ = sqlx::query("SELECT pg_terminate_backend(pg_backend_pid())")
                    .execute(&mut **tx)
                    .await;
                Err(TxError::Aborted)
            })
        })
        .await;

    assert!(matches!(result, Err(TxError::Aborted)), "{:?}", result);
}
