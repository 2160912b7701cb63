//! Image upload endpoint: validates the file and forwards it to the media
//! host. Only the returned URL strings ever reach the catalog.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::media::{self, Renditions, ALLOWED_IMAGE_TYPES, MAX_IMAGE_BYTES};
use crate::{Result, StoreError};

#[derive(Debug, Deserialize)]
struct MediaHostResult {
    public_id: String,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Canonical URL, the one stored on products and variants.
    pub url: String,
    pub public_id: String,
    pub urls: Renditions,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

pub async fn upload_image(
    State(s): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StoreError::Invalid(e.to_string()))?
    {
        if field.name() == Some("file") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| StoreError::Invalid(e.to_string()))?;
            file = Some((content_type, data.to_vec()));
        }
    }

    let (content_type, data) = file.ok_or_else(|| StoreError::Invalid("no file provided".into()))?;
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(StoreError::UnsupportedImageType(content_type));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(StoreError::ImageTooLarge { limit_mib: 5 });
    }

    let endpoint = format!(
        "https://api.cloudinary.com/v1_1/{}/image/upload",
        s.config.media.cloud_name
    );
    let part = reqwest::multipart::Part::bytes(data)
        .file_name("upload")
        .mime_str(&content_type)
        .map_err(|e| StoreError::Invalid(e.to_string()))?;
    let form = reqwest::multipart::Form::new()
        .text("upload_preset", s.config.media.upload_preset.clone())
        .part("file", part);

    let response = s
        .http
        .post(&endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| StoreError::MediaHost(e.to_string()))?;
    if !response.status().is_success() {
        return Err(StoreError::MediaHost(format!(
            "upload rejected with status {}",
            response.status()
        )));
    }
    let result: MediaHostResult = response
        .json()
        .await
        .map_err(|e| StoreError::MediaHost(e.to_string()))?;

    tracing::info!(public_id = %result.public_id, "image uploaded");

    let urls = media::renditions(&s.config.media.cloud_name, &result.public_id);
    Ok(Json(UploadResponse {
        url: urls.original.clone(),
        public_id: result.public_id,
        urls,
        width: result.width,
        height: result.height,
        format: result.format,
    }))
}
