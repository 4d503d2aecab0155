//! 역할 확인 (인증 자체는 외부 서비스 담당)
//! 게이트웨이가 요청 헤더에 호출자의 역할 목록을 실어 보낸다고 가정한다.
// region:    --- Imports
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

// endregion: --- Imports

// region:    --- Role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// 카드 추가/삭제에 필요한 역할
pub const CARD_MUTATION_ROLES: [Role; 2] = [Role::User, Role::Admin];

// endregion: --- Role

// region:    --- Role Check
/// 역할 확인 트레이트
pub trait RoleCheck: Send + Sync {
    /// 호출자의 역할 목록. 인증 정보가 없으면 `None`
    fn roles(&self, headers: &HeaderMap) -> Option<Vec<Role>>;
}

/// 헤더 기반 역할 확인 (예: `x-user-roles: user,admin`)
pub struct HeaderRoleCheck {
    header: String,
}

impl HeaderRoleCheck {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl RoleCheck for HeaderRoleCheck {
    fn roles(&self, headers: &HeaderMap) -> Option<Vec<Role>> {
        let raw = headers.get(self.header.as_str())?.to_str().ok()?;
        Some(raw.split(',').filter_map(Role::parse).collect())
    }
}

/// 필요한 역할을 모두 가지고 있는지 확인
pub fn authorize(
    checker: &dyn RoleCheck,
    headers: &HeaderMap,
    required: &[Role],
) -> Result<(), AppError> {
    let Some(roles) = checker.roles(headers) else {
        return Err(AppError::Unauthenticated("Not authenticated".to_string()));
    };
    if let Some(missing) = required.iter().find(|role| !roles.contains(*role)) {
        warn!("{:<12} --> 역할 부족: {}", "Auth", missing.as_str());
        return Err(AppError::Forbidden(format!(
            "Requires {} role",
            missing.as_str()
        )));
    }
    Ok(())
}

/// 카드 변경 라우트용 미들웨어
pub async fn require_card_roles(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(state.roles.as_ref(), request.headers(), &CARD_MUTATION_ROLES)?;
    Ok(next.run(request).await)
}

// endregion: --- Role Check

// endregion: --- Tests
