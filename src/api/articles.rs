use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, put},
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::AppJson;
use crate::{
    articles::{DEFAULT_LIST_LIMIT, DEFAULT_POPULAR_LIMIT},
    auth::AuthUser,
    content::{Article, ArticleCreate, ArticlePatch, Category},
    error::Result,
    state::AppState,
    storage::{ArticleFilter, Stats, Store},
};

/// 配置文章相关路由。
///
/// 路由包括：
/// - `GET /categories`：全部分类
/// - `GET /articles`：文章列表，`POST /articles`：创建文章（需登录）
/// - `GET /articles/slug/{slug}`：按 slug 读取，阅读量加一
/// - `GET /articles/popular`：热门文章
/// - `PUT /articles/{id}`、`DELETE /articles/{id}`：修改、删除（需登录）
/// - `GET /stats`：文章数与总阅读量（需登录）
pub fn setup_route<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/categories", get(category_list::<S>))
        .route("/articles", get(article_list::<S>).post(create_article::<S>))
        .route("/articles/slug/{slug}", get(article::<S>))
        .route("/articles/popular", get(popular_list::<S>))
        .route(
            "/articles/{id}",
            put(update_article::<S>).delete(delete_article::<S>),
        )
        .route("/stats", get(stats::<S>))
}

/// 查询参数，用于文章列表分页和筛选。
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ListParams {
    categoria_id: Option<String>,
    destaque: Option<bool>,
    limit: u32,
    skip: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            categoria_id: None,
            destaque: None,
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PopularParams {
    limit: u32,
}

impl Default for PopularParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_POPULAR_LIMIT,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

async fn category_list<S: Store>(State(app): State<AppState<S>>) -> Result<Json<Vec<Category>>> {
    app.articles().categories().await.map(Json)
}

/// 获取文章列表。
///
/// 空的 `categoria_id` 视为未指定。
async fn article_list<S: Store>(
    Query(params): Query<ListParams>,
    State(app): State<AppState<S>>,
) -> Result<Json<Vec<Article>>> {
    let filter = ArticleFilter {
        categoria_id: params.categoria_id.filter(|id| !id.is_empty()),
        destaque: params.destaque,
    };

    app.articles()
        .list(&filter, params.limit, params.skip)
        .await
        .map(Json)
}

/// 根据 slug 获取单篇文章，阅读量加一。
async fn article<S: Store>(
    Path(slug): Path<String>,
    State(app): State<AppState<S>>,
) -> Result<Json<Article>> {
    app.articles().get_by_slug(&slug).await.map(Json)
}

async fn popular_list<S: Store>(
    Query(params): Query<PopularParams>,
    State(app): State<AppState<S>>,
) -> Result<Json<Vec<Article>>> {
    app.articles().popular(params.limit).await.map(Json)
}

#[instrument(skip_all, fields(author = %user.id))]
async fn create_article<S: Store>(
    State(app): State<AppState<S>>,
    AuthUser(user): AuthUser,
    AppJson(input): AppJson<ArticleCreate>,
) -> Result<Json<Article>> {
    app.articles().create(input, &user).await.map(Json)
}

#[instrument(skip(app, user, patch), fields(author = %user.id))]
async fn update_article<S: Store>(
    Path(id): Path<String>,
    State(app): State<AppState<S>>,
    AuthUser(user): AuthUser,
    AppJson(patch): AppJson<ArticlePatch>,
) -> Result<Json<Article>> {
    app.articles().update(&id, patch).await.map(Json)
}

#[instrument(skip(app, user), fields(author = %user.id))]
async fn delete_article<S: Store>(
    Path(id): Path<String>,
    State(app): State<AppState<S>>,
    AuthUser(user): AuthUser,
) -> Result<Json<MessageResponse>> {
    app.articles().delete(&id).await?;

    Ok(Json(MessageResponse {
        message: "Artigo deletado com sucesso",
    }))
}

async fn stats<S: Store>(State(app): State<AppState<S>>, _user: AuthUser) -> Result<Json<Stats>> {
    app.articles().stats().await.map(Json)
}
