// region:    --- Imports
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Defaults
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
// 업로드 이미지 최대 크기 (5MB)
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_ROLE_HEADER: &str = "x-user-roles";

// endregion: --- Defaults

// region:    --- Config Error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("환경 변수 {name} 값이 올바르지 않습니다: {value}")]
    Invalid { name: &'static str, value: String },
}

// endregion: --- Config Error

// region:    --- App Config
/// 서비스 설정
/// 전역 상태 대신 시작 시점에 한 번 읽어서 각 구성 요소에 전달한다.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 없으면 인메모리 저장소로 동작
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub bind_addr: SocketAddr,
    /// 정적 파일 루트. 이미지는 `<static_dir>/images` 아래에 저장된다.
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub role_header: String,
    /// 시작 시 없으면 만들어 둘 프로필 (SEED_PROFILES, 쉼표 구분)
    pub seed_profiles: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            role_header: DEFAULT_ROLE_HEADER.to_string(),
            seed_profiles: Vec::new(),
        }
    }
}

impl AppConfig {
    /// 환경 변수에서 설정 읽기
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 임의의 조회 함수로 설정 구성 (테스트용으로도 사용)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let max_connections = parse_or("DATABASE_MAX_CONNECTIONS", &lookup, DEFAULT_MAX_CONNECTIONS)?;
        let max_upload_bytes = parse_or("MAX_UPLOAD_BYTES", &lookup, DEFAULT_MAX_UPLOAD_BYTES)?;

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let static_dir = lookup("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let role_header = lookup("ROLE_HEADER")
            .map(|h| h.trim().to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_ROLE_HEADER.to_string());
        if role_header.is_empty() {
            return Err(ConfigError::Invalid {
                name: "ROLE_HEADER",
                value: role_header,
            });
        }

        let seed_profiles = lookup("SEED_PROFILES")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            max_connections,
            bind_addr,
            static_dir,
            max_upload_bytes,
            role_header,
            seed_profiles,
        })
    }

    /// 업로드 이미지 저장 디렉터리
    pub fn image_dir(&self) -> PathBuf {
        self.static_dir.join("images")
    }
}

fn parse_or<T, F>(name: &'static str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

// endregion: --- App Config

// endregion: --- Tests
