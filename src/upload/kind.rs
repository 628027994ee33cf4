use std::path::Path;

use crate::{error::ApiError, models::users::Role};

const MIB: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Image,
    Video,
}

impl UploadKind {
    /// Sub-directory of the upload root, also the URL segment under `/uploads`.
    pub fn dir(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Image => "images",
            UploadKind::Video => "videos",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume => &["pdf", "doc", "docx"],
            UploadKind::Image => &["jpg", "jpeg", "png", "gif", "webp"],
            UploadKind::Video => &["mp4", "webm", "mov"],
        }
    }

    pub fn max_bytes(&self) -> usize {
        match self {
            UploadKind::Resume | UploadKind::Image => 5 * MIB,
            UploadKind::Video => 50 * MIB,
        }
    }

    /// Roles allowed to upload; `None` means any signed-in user.
    pub fn roles(&self) -> Option<&'static [Role]> {
        match self {
            UploadKind::Resume => None,
            UploadKind::Image => Some(&[Role::Hr, Role::Admin]),
            UploadKind::Video => Some(&[Role::Admin]),
        }
    }

    /// Lowercased extension of `filename` when it is allowed for this kind.
    pub fn check_extension(&self, filename: &str) -> Result<String, ApiError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if self.extensions().contains(&ext.as_str()) {
            Ok(ext)
        } else {
            Err(ApiError::BadRequest(format!(
                "Invalid file type, allowed: {}",
                self.extensions().join(", ")
            )))
        }
    }

    pub fn too_large(&self) -> ApiError {
        ApiError::PayloadTooLarge(format!(
            "File too large, maximum size is {} MB",
            self.max_bytes() / MIB
        ))
    }
}
