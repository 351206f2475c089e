use std::{str::FromStr, time::Duration};

use sqlx::{
    Postgres, QueryBuilder,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use super::{ArticleFilter, Stats, Store};
use crate::{
    content::{Article, ArticleChanges, Category, User, UserRecord},
    error::{Error, Result},
};

/// 数据库连接池类型
pub type DBPool = sqlx::PgPool;

/// 建表语句，启动时执行
pub const SCHEMA: &str = include_str!("../../sql/01-CREATE_TABLE.sql");

/// 根据连接 URL 初始化连接池，`database` 不为空时覆盖连接串中的数据库名
pub async fn init_db(conn_url: &str, database: Option<&str>) -> Result<DBPool> {
    let mut options = PgConnectOptions::from_str(conn_url)?;
    if let Some(database) = database {
        options = options.database(database);
    }
    Ok(new_db_poll(options).await?)
}

/// 创建新的数据库连接池
///
/// 连接池配置：
///
/// - 最大空闲时间 60 秒
/// - 最大生存时间 1500 秒（约 25 分钟）
/// - 最大连接数 10
/// - 获取连接超时 2 秒
/// - 获取前测试连接
/// - 最小连接数 2
pub async fn new_db_poll(options: PgConnectOptions) -> core::result::Result<DBPool, sqlx::Error> {
    PgPoolOptions::new()
        .idle_timeout(Duration::from_secs(60))
        .max_lifetime(Duration::from_secs(1500))
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(2))
        .test_before_acquire(true)
        .min_connections(2)
        .connect_with(options)
        .await
}

/// 执行迁移语句
///
/// 按 `;` 分割，每条 SQL 单独执行
pub async fn migrate(db: &DBPool, sql: &str) -> core::result::Result<(), sqlx::Error> {
    for stmt in sql.split(';') {
        if stmt.trim().is_empty() {
            continue;
        }
        sqlx::query(stmt).execute(db).await?;
    }
    Ok(())
}

/// 唯一约束冲突转换为业务错误
fn on_unique_violation(e: sqlx::Error, conflict: Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => conflict,
        _ => e.into(),
    }
}

impl Store for DBPool {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, nome, created_at, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self)
        .await?;
        Ok(record)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, nome, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, record: &UserRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, nome, created_at, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.user.id)
        .bind(&record.user.email)
        .bind(&record.user.nome)
        .bind(record.user.created_at)
        .bind(&record.password_hash)
        .execute(self)
        .await
        .map_err(|e| on_unique_violation(e, Error::EmailTaken))?;
        Ok(())
    }

    async fn categories(&self, limit: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT id, nome, slug FROM categories LIMIT $1")
            .bind(limit)
            .fetch_all(self)
            .await?;
        Ok(rows)
    }

    async fn category(&self, id: &str) -> Result<Option<Category>> {
        let row = sqlx::query_as::<_, Category>(
            "SELECT id, nome, slug FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self)
        .await?;
        Ok(row)
    }

    async fn count_categories(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(self)
            .await?;
        Ok(count)
    }

    async fn insert_categories(&self, categories: &[Category]) -> Result<()> {
        if categories.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO categories (id, nome, slug) ");
        builder.push_values(categories, |mut row, category| {
            row.push_bind(&category.id)
                .push_bind(&category.nome)
                .push_bind(&category.slug);
        });
        builder.build().execute(self).await?;
        Ok(())
    }

    async fn insert_article(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO articles
                (id, titulo, slug, resumo, conteudo, imagem_url, categoria_id, categoria_nome,
                 autor_id, autor_nome, data_publicacao, ultima_atualizacao, destaque, visualizacoes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&article.id)
        .bind(&article.titulo)
        .bind(&article.slug)
        .bind(&article.resumo)
        .bind(&article.conteudo)
        .bind(&article.imagem_url)
        .bind(&article.categoria_id)
        .bind(&article.categoria_nome)
        .bind(&article.autor_id)
        .bind(&article.autor_nome)
        .bind(article.data_publicacao)
        .bind(article.ultima_atualizacao)
        .bind(article.destaque)
        .bind(article.visualizacoes)
        .execute(self)
        .await
        .map_err(|e| on_unique_violation(e, Error::SlugTaken))?;
        Ok(())
    }

    async fn articles(&self, filter: &ArticleFilter, limit: i64, skip: i64) -> Result<Vec<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM articles WHERE TRUE");

        if let Some(categoria_id) = &filter.categoria_id {
            builder.push(" AND categoria_id = ").push_bind(categoria_id);
        }
        if let Some(destaque) = filter.destaque {
            builder.push(" AND destaque = ").push_bind(destaque);
        }

        builder.push(" ORDER BY data_publicacao DESC");
        builder.push(" LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(skip);

        let rows = builder.build_query_as::<Article>().fetch_all(self).await?;
        Ok(rows)
    }

    async fn article_by_id(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(row)
    }

    async fn increment_views(&self, slug: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, Article>(
            r#"
            UPDATE articles
            SET visualizacoes = visualizacoes + 1
            WHERE slug = $1
            RETURNING *
            "#,
        )
        .bind(slug)
        .fetch_optional(self)
        .await?;
        Ok(row)
    }

    async fn popular(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, Article>(
            r#"
            SELECT * FROM articles
            ORDER BY visualizacoes DESC, data_publicacao DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self)
        .await?;
        Ok(rows)
    }

    async fn update_article(&self, id: &str, changes: &ArticleChanges) -> Result<Option<Article>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE articles SET ultima_atualizacao = ");
        builder.push_bind(changes.ultima_atualizacao);

        if let Some(titulo) = &changes.titulo {
            builder.push(", titulo = ").push_bind(titulo);
        }
        if let Some(slug) = &changes.slug {
            builder.push(", slug = ").push_bind(slug);
        }
        if let Some(resumo) = &changes.resumo {
            builder.push(", resumo = ").push_bind(resumo);
        }
        if let Some(conteudo) = &changes.conteudo {
            builder.push(", conteudo = ").push_bind(conteudo);
        }
        if let Some(imagem_url) = &changes.imagem_url {
            builder.push(", imagem_url = ").push_bind(imagem_url);
        }
        if let Some(category) = &changes.categoria {
            builder.push(", categoria_id = ").push_bind(&category.id);
            builder.push(", categoria_nome = ").push_bind(&category.nome);
        }
        if let Some(destaque) = changes.destaque {
            builder.push(", destaque = ").push_bind(destaque);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        let row = builder
            .build_query_as::<Article>()
            .fetch_optional(self)
            .await
            .map_err(|e| on_unique_violation(e, Error::SlugTaken))?;
        Ok(row)
    }

    async fn delete_article(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(self)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn article_stats(&self) -> Result<Stats> {
        let stats = sqlx::query_as::<_, Stats>(
            r#"
            SELECT COUNT(*) AS total_articles,
                   COALESCE(SUM(visualizacoes), 0)::BIGINT AS total_views
            FROM articles
            "#,
        )
        .fetch_one(self)
        .await?;
        Ok(stats)
    }
}
