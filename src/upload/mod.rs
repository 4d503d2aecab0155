//! 경매 이미지 업로드 저장
// region:    --- Imports
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// 허용 이미지 확장자
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// 이미지 공개 URL 접두사
pub const PUBLIC_IMAGE_PREFIX: &str = "/static/images";

// region:    --- Storage Error
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid file type. Only PNG, JPG, JPEG, and GIF are allowed.")]
    InvalidExtension,
    #[error("File too large. Maximum size is {max} bytes")]
    TooLarge { size: usize, max: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// endregion: --- Storage Error

// region:    --- Helpers
/// 확장자 추출 (소문자, 점 제외)
fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// 허용된 확장자인지 확인
pub fn is_valid_file(filename: &str) -> bool {
    extension_of(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// UUID 기반의 중복 없는 파일 이름 생성
pub fn generate_unique_filename(filename: &str) -> String {
    match extension_of(filename) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

// endregion: --- Helpers

// region:    --- Image Store
/// 저장된 이미지 정보
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub filename: String,
    pub path: PathBuf,
    pub url: String,
}

/// 업로드 중인 이미지
/// 본문을 읽는 동안 `<최종 이름>.part` 임시 파일에 기록하고, `ImageStore::commit`에서
/// 검증을 통과하면 최종 이름으로 옮긴다.
pub struct StagedImage {
    file: fs::File,
    original_name: String,
    staging_path: PathBuf,
    image: StoredImage,
    size: usize,
    max_bytes: usize,
}

impl StagedImage {
    /// 클라이언트가 보낸 파일 이름
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// 커밋 후 사용할 파일 이름
    pub fn filename(&self) -> &str {
        &self.image.filename
    }

    /// 지금까지 받은 바이트 수 (최대 크기 초과분 포함)
    pub fn size(&self) -> usize {
        self.size
    }

    /// 청크 기록. 최대 크기를 넘은 뒤에는 기록하지 않고 크기만 센다.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), StorageError> {
        self.size = self.size.saturating_add(chunk.len());
        if self.size <= self.max_bytes {
            self.file.write_all(chunk).await?;
        }
        Ok(())
    }

    /// 임시 파일 삭제 (실패해도 요청은 계속 진행)
    pub async fn discard(self) {
        let Self {
            file, staging_path, ..
        } = self;
        drop(file);
        if let Err(e) = fs::remove_file(&staging_path).await {
            warn!(
                "{:<12} --> 임시 파일 삭제 실패: {} ({})",
                "Upload",
                staging_path.display(),
                e
            );
        }
    }

    async fn persist(&mut self) -> std::io::Result<()> {
        self.file.flush().await?;
        fs::rename(&self.staging_path, &self.image.path).await
    }
}

/// 이미지 저장소
pub struct ImageStore {
    image_dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(image_dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            image_dir: image_dir.into(),
            max_bytes,
        }
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// 저장 디렉터리 생성
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.image_dir).await?;
        Ok(())
    }

    /// 확장자와 크기 검증
    pub fn validate(&self, filename: &str, size: usize) -> Result<(), StorageError> {
        if !is_valid_file(filename) {
            return Err(StorageError::InvalidExtension);
        }
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(())
    }

    /// 임시 파일 생성. 확장자와 크기는 `commit`에서 검증한다.
    pub async fn stage(&self, filename: &str) -> Result<StagedImage, StorageError> {
        let unique_filename = generate_unique_filename(filename);
        let staging_path = self.image_dir.join(format!("{}.part", unique_filename));

        // create_new: 같은 이름의 파일이 이미 있으면 덮어쓰지 않는다
        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&staging_path)
            .await?;

        Ok(StagedImage {
            file,
            original_name: filename.to_string(),
            staging_path,
            image: StoredImage {
                url: format!("{}/{}", PUBLIC_IMAGE_PREFIX, unique_filename),
                path: self.image_dir.join(&unique_filename),
                filename: unique_filename,
            },
            size: 0,
            max_bytes: self.max_bytes,
        })
    }

    /// 검증 후 임시 파일을 최종 이름으로 옮긴다. 실패하면 임시 파일은 삭제된다.
    pub async fn commit(&self, mut staged: StagedImage) -> Result<StoredImage, StorageError> {
        let result = match self.validate(&staged.original_name, staged.size) {
            Ok(()) => staged.persist().await.map_err(StorageError::from),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            staged.discard().await;
            return Err(e);
        }

        info!(
            "{:<12} --> 이미지 저장 완료: {} ({} bytes)",
            "Upload", staged.image.filename, staged.size
        );
        Ok(staged.image)
    }

    /// 메모리에 있는 이미지를 한 번에 저장
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<StoredImage, StorageError> {
        self.validate(filename, bytes.len())?;

        let mut staged = self.stage(filename).await?;
        if let Err(e) = staged.write_chunk(bytes).await {
            staged.discard().await;
            return Err(e);
        }
        self.commit(staged).await
    }

    /// 저장된 이미지 삭제 (실패해도 요청은 계속 진행)
    pub async fn remove(&self, image: &StoredImage) {
        if let Err(e) = fs::remove_file(&image.path).await {
            warn!(
                "{:<12} --> 이미지 삭제 실패: {} ({})",
                "Upload", image.filename, e
            );
        }
    }
}
// endregion: --- Image Store

// endregion: --- Tests
