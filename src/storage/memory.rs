use std::sync::Arc;

use tokio::sync::RwLock;

use super::{ArticleFilter, Stats, Store};
use crate::{
    content::{Article, ArticleChanges, Category, User, UserRecord},
    error::{Error, Result},
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRecord>,
    categories: Vec<Category>,
    articles: Vec<Article>,
}

/// 进程内存储
///
/// 与 PostgreSQL 实现语义一致，用于测试和无数据库的本地运行，重启后数据丢失。
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

fn by_newest(a: &Article, b: &Article) -> std::cmp::Ordering {
    b.data_publicacao.cmp(&a.data_publicacao)
}

impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.user.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.user.clone()))
    }

    async fn insert_user(&self, record: &UserRecord) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.user.email == record.user.email) {
            return Err(Error::EmailTaken);
        }
        tables.users.push(record.clone());
        Ok(())
    }

    async fn categories(&self, limit: i64) -> Result<Vec<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn category(&self, id: &str) -> Result<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn count_categories(&self) -> Result<i64> {
        Ok(self.tables.read().await.categories.len() as i64)
    }

    async fn insert_categories(&self, categories: &[Category]) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.categories.extend_from_slice(categories);
        Ok(())
    }

    async fn insert_article(&self, article: &Article) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.articles.iter().any(|a| a.slug == article.slug) {
            return Err(Error::SlugTaken);
        }
        tables.articles.push(article.clone());
        Ok(())
    }

    async fn articles(&self, filter: &ArticleFilter, limit: i64, skip: i64) -> Result<Vec<Article>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<_> = tables
            .articles
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        rows.sort_by(by_newest);

        Ok(rows
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn article_by_id(&self, id: &str) -> Result<Option<Article>> {
        let tables = self.tables.read().await;
        Ok(tables.articles.iter().find(|a| a.id == id).cloned())
    }

    async fn increment_views(&self, slug: &str) -> Result<Option<Article>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .articles
            .iter_mut()
            .find(|a| a.slug == slug)
            .map(|a| {
                a.visualizacoes += 1;
                a.clone()
            }))
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Article>> {
        let tables = self.tables.read().await;
        let mut rows = tables.articles.clone();
        rows.sort_by(|a, b| {
            b.visualizacoes
                .cmp(&a.visualizacoes)
                .then_with(|| by_newest(a, b))
        });
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn update_article(&self, id: &str, changes: &ArticleChanges) -> Result<Option<Article>> {
        let mut tables = self.tables.write().await;

        let slug_taken = changes
            .slug
            .as_ref()
            .is_some_and(|slug| tables.articles.iter().any(|a| a.slug == *slug && a.id != id));
        if slug_taken {
            return Err(Error::SlugTaken);
        }

        Ok(tables
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .map(|stored| {
                changes.apply(stored);
                stored.clone()
            }))
    }

    async fn delete_article(&self, id: &str) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.articles.len();
        tables.articles.retain(|a| a.id != id);
        Ok(tables.articles.len() < before)
    }

    async fn article_stats(&self) -> Result<Stats> {
        let tables = self.tables.read().await;
        Ok(Stats {
            total_articles: tables.articles.len() as i64,
            total_views: tables.articles.iter().map(|a| a.visualizacoes).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{content::ArticlePatch, storage::seed_categories};

    fn article(id: &str, slug: &str, minutes_ago: i64) -> Article {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        Article {
            id: id.to_string(),
            titulo: slug.to_string(),
            slug: slug.to_string(),
            resumo: String::new(),
            conteudo: String::new(),
            imagem_url: String::new(),
            categoria_id: "c1".to_string(),
            categoria_nome: "Economia".to_string(),
            autor_id: "u1".to_string(),
            autor_nome: "Autor".to_string(),
            data_publicacao: at,
            ultima_atualizacao: at,
            destaque: false,
            visualizacoes: 0,
        }
    }

    #[tokio::test]
    async fn test_seed_only_once() {
        let store = MemoryStore::new();

        assert!(seed_categories(&store).await.expect("seed"));
        assert!(!seed_categories(&store).await.expect("seed"));
        assert_eq!(store.count_categories().await.expect("count"), 5);
        assert_eq!(store.categories(2).await.expect("categories").len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected() {
        let store = MemoryStore::new();
        store.insert_article(&article("a1", "mesmo", 0)).await.expect("insert");

        let err = store.insert_article(&article("a2", "mesmo", 0)).await;
        assert!(matches!(err, Err(Error::SlugTaken)));

        store.insert_article(&article("a3", "outro", 0)).await.expect("insert");
        let rename = ArticlePatch {
            titulo: Some("Mesmo".to_string()),
            ..Default::default()
        }
        .into_changes(None, Utc::now());
        assert!(matches!(
            store.update_article("a3", &rename).await,
            Err(Error::SlugTaken)
        ));

        let stored = store.article_by_id("a3").await.expect("get").expect("exists");
        assert_eq!(stored.slug, "outro");
    }

    #[tokio::test]
    async fn test_update_writes_only_present_fields() {
        let store = MemoryStore::new();
        store.insert_article(&article("a1", "a1", 0)).await.expect("insert");

        let changes = ArticlePatch {
            resumo: Some("novo resumo".to_string()),
            ..Default::default()
        }
        .into_changes(None, Utc::now());
        let updated = store
            .update_article("a1", &changes)
            .await
            .expect("update")
            .expect("exists");

        assert_eq!(updated.resumo, "novo resumo");
        assert_eq!(updated.titulo, "a1");
        assert_eq!(updated.slug, "a1");
        assert_eq!(updated.ultima_atualizacao, changes.ultima_atualizacao);
        assert!(store.update_article("nada", &changes).await.expect("update").is_none());
    }

    #[tokio::test]
    async fn test_list_order_filter_and_paging() {
        let store = MemoryStore::new();
        store.insert_article(&article("old", "old", 30)).await.expect("insert");
        store.insert_article(&article("new", "new", 1)).await.expect("insert");
        let mut featured = article("mid", "mid", 10);
        featured.destaque = true;
        store.insert_article(&featured).await.expect("insert");

        let all = store
            .articles(&ArticleFilter::default(), 50, 0)
            .await
            .expect("list");
        let ids: Vec<_> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["new", "mid", "old"]);

        let page = store
            .articles(&ArticleFilter::default(), 1, 1)
            .await
            .expect("list");
        assert_eq!(page[0].id, "mid");

        let filter = ArticleFilter {
            destaque: Some(true),
            ..Default::default()
        };
        let only = store.articles(&filter, 50, 0).await.expect("list");
        assert_eq!(only.len(), 1);
        assert_eq!(only[0].id, "mid");

        let filter = ArticleFilter {
            categoria_id: Some("outra".to_string()),
            ..Default::default()
        };
        assert!(store.articles(&filter, 50, 0).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_views_popular_and_stats() {
        let store = MemoryStore::new();
        store.insert_article(&article("a", "a", 0)).await.expect("insert");
        store.insert_article(&article("b", "b", 0)).await.expect("insert");

        for expected in 1..=3 {
            let a = store.increment_views("b").await.expect("inc").expect("exists");
            assert_eq!(a.visualizacoes, expected);
        }
        store.increment_views("a").await.expect("inc");
        assert!(store.increment_views("nada").await.expect("inc").is_none());

        let popular = store.popular(1).await.expect("popular");
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].id, "b");

        let stats = store.article_stats().await.expect("stats");
        assert_eq!(stats, Stats { total_articles: 2, total_views: 4 });

        assert!(store.delete_article("a").await.expect("delete"));
        assert!(!store.delete_article("a").await.expect("delete"));
        let stats = store.article_stats().await.expect("stats");
        assert_eq!(stats, Stats { total_articles: 1, total_views: 3 });
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let stats = MemoryStore::new().article_stats().await.expect("stats");
        assert_eq!(stats, Stats { total_articles: 0, total_views: 0 });
    }
}
