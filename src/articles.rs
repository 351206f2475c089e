use crate::{
    content::{Article, ArticleCreate, ArticlePatch, Category, User, derive_slug, new_id, now},
    error::{Error, Result},
    storage::{ArticleFilter, Stats, Store},
};

/// 分类列表上限
pub const CATEGORY_PAGE_SIZE: i64 = 100;
/// 文章列表默认条数
pub const DEFAULT_LIST_LIMIT: u32 = 50;
/// 热门文章默认条数
pub const DEFAULT_POPULAR_LIMIT: u32 = 5;

/// 文章与分类的业务操作
///
/// 在 [`Store`] 之上负责 slug 推导、分类名冗余、作者信息填充和时间戳维护。
pub struct ArticleRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: Store> ArticleRepository<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 全部分类，最多 [`CATEGORY_PAGE_SIZE`] 个
    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.store.categories(CATEGORY_PAGE_SIZE).await
    }

    /// 创建文章
    ///
    /// 作者取自 `author`，阅读量从 0 开始。
    pub async fn create(&self, input: ArticleCreate, author: &User) -> Result<Article> {
        let slug = non_empty_slug(&input.titulo)?;

        let category = self
            .store
            .category(&input.categoria_id)
            .await?
            .ok_or(Error::CategoryNotFound)?;

        let now = now();
        let article = Article {
            id: new_id(),
            titulo: input.titulo,
            slug,
            resumo: input.resumo,
            conteudo: input.conteudo,
            imagem_url: input.imagem_url,
            categoria_id: category.id,
            categoria_nome: category.nome,
            autor_id: author.id.clone(),
            autor_nome: author.nome.clone(),
            data_publicacao: now,
            ultima_atualizacao: now,
            destaque: input.destaque,
            visualizacoes: 0,
        };

        self.store.insert_article(&article).await?;
        tracing::info!(article = %article.id, slug = %article.slug, "article created");

        Ok(article)
    }

    /// 按发布时间倒序分页
    pub async fn list(&self, filter: &ArticleFilter, limit: u32, skip: u32) -> Result<Vec<Article>> {
        self.store
            .articles(filter, i64::from(limit), i64::from(skip))
            .await
    }

    /// 按 slug 读取文章，同时阅读量加一
    pub async fn get_by_slug(&self, slug: &str) -> Result<Article> {
        self.store
            .increment_views(slug)
            .await?
            .ok_or(Error::ArticleNotFound)
    }

    /// 阅读量最高的文章
    pub async fn popular(&self, limit: u32) -> Result<Vec<Article>> {
        self.store.popular(i64::from(limit)).await
    }

    /// 部分更新
    ///
    /// 只写入补丁中出现的字段，并发修改不同字段时互不覆盖。修改标题时重新推导
    /// slug；修改分类时重新读取分类名，分类不存在返回 [`Error::CategoryNotFound`]。
    /// `ultima_atualizacao` 总是刷新。
    pub async fn update(&self, id: &str, patch: ArticlePatch) -> Result<Article> {
        if self.store.article_by_id(id).await?.is_none() {
            return Err(Error::ArticleNotFound);
        }

        if let Some(titulo) = &patch.titulo {
            non_empty_slug(titulo)?;
        }

        let category = match &patch.categoria_id {
            Some(categoria_id) => Some(
                self.store
                    .category(categoria_id)
                    .await?
                    .ok_or(Error::CategoryNotFound)?,
            ),
            None => None,
        };

        let changes = patch.into_changes(category, now());
        let article = self
            .store
            .update_article(id, &changes)
            .await?
            .ok_or(Error::ArticleNotFound)?;
        tracing::info!(article = %article.id, "article updated");

        Ok(article)
    }

    /// 删除文章，不可恢复
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete_article(id).await? {
            return Err(Error::ArticleNotFound);
        }
        tracing::info!(article = %id, "article deleted");
        Ok(())
    }

    pub async fn stats(&self) -> Result<Stats> {
        self.store.article_stats().await
    }
}

fn non_empty_slug(titulo: &str) -> Result<String> {
    let slug = derive_slug(titulo);
    if slug.is_empty() {
        return Err(Error::Validation(
            "titulo: precisa conter ao menos uma letra ou número".to_string(),
        ));
    }
    Ok(slug)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{
        content::{ArticleChanges, UserRecord},
        storage::{MemoryStore, seed_categories},
    };

    /// 读取文章后让出执行权，使并发请求交错执行
    #[derive(Clone)]
    struct YieldingStore(MemoryStore);

    async fn yield_a_few() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    impl Store for YieldingStore {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
            self.0.find_user_by_email(email).await
        }

        async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
            self.0.find_user_by_id(id).await
        }

        async fn insert_user(&self, user: &UserRecord) -> Result<()> {
            self.0.insert_user(user).await
        }

        async fn categories(&self, limit: i64) -> Result<Vec<Category>> {
            self.0.categories(limit).await
        }

        async fn category(&self, id: &str) -> Result<Option<Category>> {
            self.0.category(id).await
        }

        async fn count_categories(&self) -> Result<i64> {
            self.0.count_categories().await
        }

        async fn insert_categories(&self, categories: &[Category]) -> Result<()> {
            self.0.insert_categories(categories).await
        }

        async fn insert_article(&self, article: &Article) -> Result<()> {
            self.0.insert_article(article).await
        }

        async fn articles(&self, filter: &ArticleFilter, limit: i64, skip: i64) -> Result<Vec<Article>> {
            self.0.articles(filter, limit, skip).await
        }

        async fn article_by_id(&self, id: &str) -> Result<Option<Article>> {
            let article = self.0.article_by_id(id).await?;
            yield_a_few().await;
            Ok(article)
        }

        async fn increment_views(&self, slug: &str) -> Result<Option<Article>> {
            self.0.increment_views(slug).await
        }

        async fn popular(&self, limit: i64) -> Result<Vec<Article>> {
            self.0.popular(limit).await
        }

        async fn update_article(&self, id: &str, changes: &ArticleChanges) -> Result<Option<Article>> {
            self.0.update_article(id, changes).await
        }

        async fn delete_article(&self, id: &str) -> Result<bool> {
            self.0.delete_article(id).await
        }

        async fn article_stats(&self) -> Result<Stats> {
            self.0.article_stats().await
        }
    }

    fn author() -> User {
        User {
            id: "autor-1".to_string(),
            email: "autor@jornal.com".to_string(),
            nome: "Autora".to_string(),
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> (MemoryStore, Vec<Category>) {
        let store = MemoryStore::new();
        seed_categories(&store).await.expect("seed");
        let categories = store.categories(CATEGORY_PAGE_SIZE).await.expect("categories");
        (store, categories)
    }

    fn input(titulo: &str, categoria_id: &str) -> ArticleCreate {
        ArticleCreate {
            titulo: titulo.to_string(),
            resumo: "Resumo".to_string(),
            conteudo: "Conteúdo".to_string(),
            imagem_url: "https://img/1.png".to_string(),
            categoria_id: categoria_id.to_string(),
            destaque: false,
        }
    }

    #[tokio::test]
    async fn test_create_stamps_author_and_slug() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);

        let article = repo
            .create(input("Política: Nova Lei", &categories[0].id), &author())
            .await
            .expect("create");

        assert_eq!(article.slug, "politica-nova-lei");
        assert_eq!(article.autor_id, "autor-1");
        assert_eq!(article.autor_nome, "Autora");
        assert_eq!(article.categoria_nome, categories[0].nome);
        assert_eq!(article.visualizacoes, 0);
        assert_eq!(article.data_publicacao, article.ultima_atualizacao);
    }

    #[tokio::test]
    async fn test_create_unknown_category() {
        let (store, _) = seeded().await;
        let repo = ArticleRepository::new(&store);

        let result = repo.create(input("Título", "nao-existe"), &author()).await;
        assert!(matches!(result, Err(Error::CategoryNotFound)));
        assert_eq!(repo.stats().await.expect("stats").total_articles, 0);
    }

    #[tokio::test]
    async fn test_create_rejects_empty_slug_and_duplicates() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);
        let category = &categories[0].id;

        let result = repo.create(input("  ?! ", category), &author()).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        repo.create(input("Mesma Manchete", category), &author())
            .await
            .expect("create");
        let result = repo
            .create(input("mesma manchete!", category), &author())
            .await;
        assert!(matches!(result, Err(Error::SlugTaken)));
    }

    #[tokio::test]
    async fn test_get_by_slug_increments() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);
        let created = repo
            .create(input("Leitura", &categories[1].id), &author())
            .await
            .expect("create");

        let first = repo.get_by_slug(&created.slug).await.expect("get");
        let second = repo.get_by_slug(&created.slug).await.expect("get");
        assert_eq!(first.visualizacoes, 1);
        assert_eq!(second.visualizacoes, 2);

        assert!(matches!(
            repo.get_by_slug("nao-existe").await,
            Err(Error::ArticleNotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_title_and_category() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);
        let created = repo
            .create(input("Antigo", &categories[0].id), &author())
            .await
            .expect("create");

        let patch = ArticlePatch {
            titulo: Some("New Title".to_string()),
            categoria_id: Some(categories[2].id.clone()),
            ..Default::default()
        };
        let updated = repo.update(&created.id, patch).await.expect("update");

        assert_eq!(updated.titulo, "New Title");
        assert_eq!(updated.slug, "new-title");
        assert_eq!(updated.categoria_id, categories[2].id);
        assert_eq!(updated.categoria_nome, categories[2].nome);
        assert_eq!(updated.resumo, created.resumo);
        assert_eq!(updated.autor_id, created.autor_id);
        assert_eq!(updated.data_publicacao, created.data_publicacao);
        assert!(updated.ultima_atualizacao >= created.ultima_atualizacao);
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_both_fields() {
        let (memory, categories) = seeded().await;
        let store = YieldingStore(memory);
        let repo = ArticleRepository::new(&store);
        let created = repo
            .create(input("Disputada", &categories[0].id), &author())
            .await
            .expect("create");

        let resumo = ArticlePatch {
            resumo: Some("r1".to_string()),
            ..Default::default()
        };
        let conteudo = ArticlePatch {
            conteudo: Some("c2".to_string()),
            ..Default::default()
        };
        let (a, b) = tokio::join!(
            repo.update(&created.id, resumo),
            repo.update(&created.id, conteudo)
        );
        a.expect("update resumo");
        b.expect("update conteudo");

        let stored = store.article_by_id(&created.id).await.expect("get").expect("exists");
        assert_eq!(stored.resumo, "r1");
        assert_eq!(stored.conteudo, "c2");
        assert_eq!(stored.titulo, created.titulo);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);
        let created = repo
            .create(input("Estável", &categories[0].id), &author())
            .await
            .expect("create");

        let patch = ArticlePatch {
            categoria_id: Some("nao-existe".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            repo.update(&created.id, patch).await,
            Err(Error::CategoryNotFound)
        ));

        let stored = store.article_by_id(&created.id).await.expect("get").expect("exists");
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let (store, _) = seeded().await;
        let repo = ArticleRepository::new(&store);

        assert!(matches!(
            repo.update("nao-existe", ArticlePatch::default()).await,
            Err(Error::ArticleNotFound)
        ));
        assert!(matches!(
            repo.delete("nao-existe").await,
            Err(Error::ArticleNotFound)
        ));
    }

    #[tokio::test]
    async fn test_delete_then_lookup_fails() {
        let (store, categories) = seeded().await;
        let repo = ArticleRepository::new(&store);
        let created = repo
            .create(input("Efêmero", &categories[0].id), &author())
            .await
            .expect("create");

        repo.delete(&created.id).await.expect("delete");
        assert!(matches!(
            repo.get_by_slug(&created.slug).await,
            Err(Error::ArticleNotFound)
        ));
    }
}
