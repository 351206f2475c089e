use axum::extract::FromRequest;

use crate::error::Error;

/// JSON 请求体
///
/// 与 [`axum::Json`] 相同，但解析失败时返回 [`Error::Validation`]，
/// 响应体里带有出错的字段。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);
