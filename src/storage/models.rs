use serde::Serialize;

/// 文章列表的精确匹配过滤条件
///
/// 为 `None` 的字段不参与过滤。
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub categoria_id: Option<String>,
    pub destaque: Option<bool>,
}

impl ArticleFilter {
    pub(crate) fn matches(&self, article: &crate::content::Article) -> bool {
        self.categoria_id
            .as_ref()
            .is_none_or(|id| *id == article.categoria_id)
            && self.destaque.is_none_or(|d| d == article.destaque)
    }
}

/// 文章总数与总阅读量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Stats {
    pub total_articles: i64,
    pub total_views: i64,
}
