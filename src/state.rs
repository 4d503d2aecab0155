// region:    --- Imports
use crate::auction::service::{AuctionService, PostgresAuctionService};
use crate::auth::{HeaderRoleCheck, RoleCheck};
use crate::card::service::{CardService, PostgresCardService};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, StoreError};
use crate::memory::MemoryStore;
use crate::upload::ImageStore;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub cards: Arc<dyn CardService>,
    pub auctions: Arc<dyn AuctionService>,
    pub images: Arc<ImageStore>,
    pub roles: Arc<dyn RoleCheck>,
}

impl AppState {
    pub fn new(
        cards: Arc<dyn CardService>,
        auctions: Arc<dyn AuctionService>,
        images: Arc<ImageStore>,
        roles: Arc<dyn RoleCheck>,
    ) -> Self {
        Self {
            cards,
            auctions,
            images,
            roles,
        }
    }

    /// 인메모리 저장소 기반 상태
    pub fn with_memory_store(store: Arc<MemoryStore>, config: &AppConfig) -> Self {
        Self::new(
            store.clone(),
            store,
            Arc::new(ImageStore::new(config.image_dir(), config.max_upload_bytes)),
            Arc::new(HeaderRoleCheck::new(config.role_header.clone())),
        )
    }

    /// 설정에 따라 저장소 선택 (DATABASE_URL이 있으면 Postgres)
    pub async fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        if config.database_url.is_none() {
            warn!(
                "{:<12} --> DATABASE_URL 미설정: 인메모리 저장소 사용",
                "State"
            );
            if config.seed_profiles.is_empty() {
                warn!(
                    "{:<12} --> SEED_PROFILES 미설정: 등록된 프로필이 없음",
                    "State"
                );
            }
            let store = Arc::new(MemoryStore::new());
            for username in &config.seed_profiles {
                store.insert_profile(username).await;
            }
            return Ok(Self::with_memory_store(store, config));
        }

        let db_manager = Arc::new(DatabaseManager::new(config).await?);
        db_manager.initialize_database().await?;
        db_manager.seed_profiles(&config.seed_profiles).await?;
        info!("{:<12} --> 데이터베이스 초기화 성공", "State");

        Ok(Self::new(
            Arc::new(PostgresCardService::new(Arc::clone(&db_manager))),
            Arc::new(PostgresAuctionService::new(db_manager)),
            Arc::new(ImageStore::new(config.image_dir(), config.max_upload_bytes)),
            Arc::new(HeaderRoleCheck::new(config.role_header.clone())),
        ))
    }
}
// endregion: --- App State

// endregion: --- Tests
