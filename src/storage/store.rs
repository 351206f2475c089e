use std::future::Future;

use super::{ArticleFilter, Stats};
use crate::{
    content::{Article, ArticleChanges, Category, User, UserRecord},
    error::Result,
};

/// 持久化接口
///
/// 按集合划分为用户、分类和文章三组操作，查询均为精确匹配。
/// 实现需要保证：
///
/// - 用户邮箱唯一，冲突时 [`insert_user`](Store::insert_user) 返回 `Error::EmailTaken`
/// - 文章 slug 唯一，冲突时写入返回 `Error::SlugTaken`
/// - [`increment_views`](Store::increment_views) 的自增是原子的
pub trait Store: Clone + Send + Sync + 'static {
    /// 按邮箱查找用户，带密码哈希
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserRecord>>> + Send;

    /// 按 id 查找用户
    fn find_user_by_id(&self, id: &str) -> impl Future<Output = Result<Option<User>>> + Send;

    /// 写入新用户
    fn insert_user(&self, user: &UserRecord) -> impl Future<Output = Result<()>> + Send;

    /// 最多返回 `limit` 个分类
    fn categories(&self, limit: i64) -> impl Future<Output = Result<Vec<Category>>> + Send;

    /// 按 id 查找分类
    fn category(&self, id: &str) -> impl Future<Output = Result<Option<Category>>> + Send;

    fn count_categories(&self) -> impl Future<Output = Result<i64>> + Send;

    fn insert_categories(
        &self,
        categories: &[Category],
    ) -> impl Future<Output = Result<()>> + Send;

    /// 写入新文章
    fn insert_article(&self, article: &Article) -> impl Future<Output = Result<()>> + Send;

    /// 按发布时间倒序分页查询
    fn articles(
        &self,
        filter: &ArticleFilter,
        limit: i64,
        skip: i64,
    ) -> impl Future<Output = Result<Vec<Article>>> + Send;

    fn article_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 阅读量原子加一，返回自增后的文章
    fn increment_views(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 按阅读量倒序
    fn popular(&self, limit: i64) -> impl Future<Output = Result<Vec<Article>>> + Send;

    /// 按 id 写入 `changes` 中出现的字段和更新时间
    ///
    /// 未出现的列保持存储中的当前值，阅读量、作者和发布时间不变。
    /// 文章不存在时返回 `None`。
    fn update_article(
        &self,
        id: &str,
        changes: &ArticleChanges,
    ) -> impl Future<Output = Result<Option<Article>>> + Send;

    /// 删除文章，返回是否存在
    fn delete_article(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;

    fn article_stats(&self) -> impl Future<Output = Result<Stats>> + Send;
}

/// 分类为空时写入固定分类
///
/// 返回是否执行了写入。
pub async fn seed_categories<S: Store>(store: &S) -> Result<bool> {
    if store.count_categories().await? > 0 {
        return Ok(false);
    }

    store.insert_categories(&Category::seeds()).await?;
    tracing::info!("categories initialized");
    Ok(true)
}
