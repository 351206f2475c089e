mod articles;
mod category;
mod slug;
mod user;

use chrono::{DateTime, SubsecRound, Utc};

pub use self::{
    articles::{Article, ArticleChanges, ArticleCreate, ArticlePatch},
    category::{Category, SEED_CATEGORIES},
    slug::derive_slug,
    user::{LoginResponse, User, UserCreate, UserLogin, UserRecord, validate_email},
};

/// 当前 UTC 时间，截断到微秒
///
/// PostgreSQL 的 `timestamptz` 只保存到微秒，截断后写入和读回的值一致。
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// 生成新的记录 id（UUID v4 字符串）
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
