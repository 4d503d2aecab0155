// region:    --- Imports
use crate::database::StoreError;
use crate::upload::StorageError;
use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- App Error
/// 핸들러에서 응답으로 변환되는 에러
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    Validation(String),
    /// 폼 필드 누락 또는 파싱 실패
    #[error("{0}")]
    Unprocessable(String),
    #[error("Failed to save file: {0}")]
    Storage(String),
    #[error("{0}")]
    CreationFailure(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) | AppError::CreationFailure(_) => StatusCode::BAD_REQUEST,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        error!("{:<12} --> 저장소 오류: {}", "Error", err);
        AppError::Internal("Internal server error".to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidExtension => AppError::Validation(err.to_string()),
            StorageError::TooLarge { .. } => AppError::Validation(err.to_string()),
            StorageError::Io(ref e) => {
                error!("{:<12} --> Failed to save file: {}", "Error", e);
                AppError::Storage(e.to_string())
            }
        }
    }
}

/// 경로 파라미터 파싱 실패도 `{"detail"}` 본문의 422로 응답한다
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

// endregion: --- App Error

// endregion: --- Tests
