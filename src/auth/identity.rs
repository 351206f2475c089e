use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use super::{AuthError, TokenService};
use crate::{
    content::User,
    error::{Error, Result},
    state::AppState,
    storage::Store,
};

/// 已认证的当前用户
///
/// 作为 extractor 使用：处理函数声明 `AuthUser` 参数即要求请求携带
/// `Authorization: Bearer <token>`，校验失败时直接返回 401。
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// 由令牌解析出当前用户
///
/// 令牌无效或过期返回 [`AuthError`]；令牌有效但用户已不存在返回
/// [`AuthError::UserNotFound`]。
pub async fn resolve<S: Store>(tokens: &TokenService, store: &S, token: &str) -> Result<User> {
    let subject = tokens.verify(token).inspect_err(|e| {
        tracing::debug!(%e, "token rejected");
    })?;

    store
        .find_user_by_id(&subject)
        .await?
        .ok_or(Error::Auth(AuthError::UserNotFound))
}

impl<S: Store> FromRequestParts<AppState<S>> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState<S>) -> Result<Self> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingToken)?;

        resolve(state.tokens(), state.store(), bearer.token())
            .await
            .map(AuthUser)
    }
}
