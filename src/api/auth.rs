use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use super::AppJson;
use crate::{
    auth::AuthUser,
    content::{LoginResponse, User, UserCreate, UserLogin},
    error::Result,
    state::AppState,
    storage::Store,
};

/// 配置认证相关路由。
///
/// - `POST /auth/register`：注册
/// - `POST /auth/login`：登录，返回访问令牌
/// - `GET /auth/me`：当前用户
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/auth/register", post(register::<S>))
        .route("/auth/login", post(login::<S>))
        .route("/auth/me", get(me))
}

async fn register<S: Store>(
    State(app): State<AppState<S>>,
    AppJson(input): AppJson<UserCreate>,
) -> Result<Json<User>> {
    app.accounts().register(input).await.map(Json)
}

async fn login<S: Store>(
    State(app): State<AppState<S>>,
    AppJson(input): AppJson<UserLogin>,
) -> Result<Json<LoginResponse>> {
    app.accounts().login(input).await.map(Json)
}

async fn me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
