use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart},
    routing::post,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;

use crate::{
    auth::AuthUser,
    error::{Error, Result},
    state::AppState,
    storage::Store,
};

/// 未声明类型时使用的 MIME
const DEFAULT_MIME: &str = "image/jpeg";
const FILE_FIELD: &str = "file";

/// `POST /upload-image`，不限制请求体大小
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new().route(
        "/upload-image",
        post(upload_image).layer(DefaultBodyLimit::disable()),
    )
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    image_url: String,
}

/// 将文件内容编码为 `data:` URI
fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// 读取 multipart 中的 `file` 字段并转换为 data URI。
async fn upload_image(AuthUser(user): AuthUser, mut multipart: Multipart) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let mime = field
            .content_type()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_string();
        let bytes = field.bytes().await?;

        tracing::debug!(user = %user.id, %mime, size = bytes.len(), "image uploaded");

        return Ok(Json(UploadResponse {
            image_url: data_uri(&mime, &bytes),
        }));
    }

    Err(Error::Validation(format!("{FILE_FIELD}: campo obrigatório")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
        assert_eq!(data_uri(DEFAULT_MIME, b""), "data:image/jpeg;base64,");
    }
}
