mod kind;
mod responses;

use crate::{auth::AuthUser, config::Config, error::ApiError};
use actix_multipart::Multipart;
use actix_web::{post, web};
use futures::TryStreamExt;
use tracing::info;

pub use self::kind::UploadKind;
use self::responses::UploadResponse;

const FILE_FIELD: &str = "file";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(upload_resume)
        .service(upload_image)
        .service(upload_video);
}

crate::api_funcs! {
    (post, upload_resume, "/resume", Created, (config: web::Data<Config>, auth: AuthUser, payload: Multipart)),
    (post, upload_image, "/image", Created, (config: web::Data<Config>, auth: AuthUser, payload: Multipart)),
    (post, upload_video, "/video", Created, (config: web::Data<Config>, auth: AuthUser, payload: Multipart)),
}

async fn upload_resume_impl(
    config: web::Data<Config>,
    auth: AuthUser,
    payload: Multipart,
) -> Result<UploadResponse, ApiError> {
    save_upload(UploadKind::Resume, &config, &auth, payload).await
}

async fn upload_image_impl(
    config: web::Data<Config>,
    auth: AuthUser,
    payload: Multipart,
) -> Result<UploadResponse, ApiError> {
    save_upload(UploadKind::Image, &config, &auth, payload).await
}

async fn upload_video_impl(
    config: web::Data<Config>,
    auth: AuthUser,
    payload: Multipart,
) -> Result<UploadResponse, ApiError> {
    save_upload(UploadKind::Video, &config, &auth, payload).await
}

fn multipart_error(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", err))
}

/// Streams the `file` field into memory up to the kind's limit, then writes it
/// under `<upload_dir>/<kind dir>/` with a generated name.
async fn save_upload(
    kind: UploadKind,
    config: &Config,
    auth: &AuthUser,
    mut payload: Multipart,
) -> Result<UploadResponse, ApiError> {
    if let Some(roles) = kind.roles() {
        auth.require(roles)?;
    }

    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let disposition = field.content_disposition();
        if disposition.get_name() != Some(FILE_FIELD) {
            continue;
        }
        let original = disposition
            .get_filename()
            .map(|name| name.to_string())
            .ok_or_else(|| ApiError::BadRequest("File name is missing".to_string()))?;
        let ext = kind.check_extension(&original)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > kind.max_bytes() {
                return Err(kind.too_large());
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
        }

        let filename = format!("{}.{}", crate::utils::generate_token(), ext);
        let dir = config.upload_dir.join(kind.dir());
        let path = dir.join(&filename);
        let size = bytes.len();
        web::block(move || {
            std::fs::create_dir_all(&dir)?;
            std::fs::write(&path, &bytes)
        })
        .await??;
        info!(user_id = auth.id, kind = kind.dir(), %filename, size, "file uploaded");

        return Ok(UploadResponse {
            url: format!("/uploads/{}/{}", kind.dir(), filename),
            filename,
            size,
        });
    }

    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
