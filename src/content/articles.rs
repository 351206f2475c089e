use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, derive_slug};

/// 文章
///
/// `categoria_nome` 与 `autor_nome` 是冗余存储的显示名，读取时不再关联查询。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Article {
    pub id: String,
    pub titulo: String,
    pub slug: String,
    pub resumo: String,
    pub conteudo: String,
    /// 外部 URL 或 `data:` URI
    pub imagem_url: String,
    pub categoria_id: String,
    pub categoria_nome: String,
    pub autor_id: String,
    pub autor_nome: String,
    pub data_publicacao: DateTime<Utc>,
    pub ultima_atualizacao: DateTime<Utc>,
    pub destaque: bool,
    pub visualizacoes: i64,
}

/// `POST /articles` 请求体
///
/// 作者信息取自当前登录用户，请求体里的作者字段会被忽略。
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleCreate {
    pub titulo: String,
    pub resumo: String,
    pub conteudo: String,
    pub imagem_url: String,
    pub categoria_id: String,
    #[serde(default)]
    pub destaque: bool,
}

/// `PUT /articles/{id}` 请求体，所有字段可选
///
/// 出现的字段覆盖原值，缺省或 `null` 的字段保持不变。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticlePatch {
    pub titulo: Option<String>,
    pub resumo: Option<String>,
    pub conteudo: Option<String>,
    pub imagem_url: Option<String>,
    pub categoria_id: Option<String>,
    pub destaque: Option<bool>,
}

impl ArticlePatch {
    /// 生成待写入的字段
    ///
    /// 修改标题时一并推导 slug。`category` 是按 `categoria_id` 查到的分类，
    /// 由调用方负责查询。
    pub fn into_changes(self, category: Option<Category>, at: DateTime<Utc>) -> ArticleChanges {
        ArticleChanges {
            slug: self.titulo.as_deref().map(derive_slug),
            titulo: self.titulo,
            resumo: self.resumo,
            conteudo: self.conteudo,
            imagem_url: self.imagem_url,
            categoria: category,
            destaque: self.destaque,
            ultima_atualizacao: at,
        }
    }
}

/// 一次部分更新要写入的列
///
/// 存储层只写入为 `Some` 的字段和 `ultima_atualizacao`，其余列保持数据库中的当前值。
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleChanges {
    pub titulo: Option<String>,
    pub slug: Option<String>,
    pub resumo: Option<String>,
    pub conteudo: Option<String>,
    pub imagem_url: Option<String>,
    /// 新分类，同时更新 `categoria_id` 和 `categoria_nome`
    pub categoria: Option<Category>,
    pub destaque: Option<bool>,
    pub ultima_atualizacao: DateTime<Utc>,
}

impl ArticleChanges {
    /// 合并到文章上
    pub fn apply(&self, article: &mut Article) {
        if let Some(titulo) = &self.titulo {
            article.titulo = titulo.clone();
        }
        if let Some(slug) = &self.slug {
            article.slug = slug.clone();
        }
        if let Some(resumo) = &self.resumo {
            article.resumo = resumo.clone();
        }
        if let Some(conteudo) = &self.conteudo {
            article.conteudo = conteudo.clone();
        }
        if let Some(imagem_url) = &self.imagem_url {
            article.imagem_url = imagem_url.clone();
        }
        if let Some(category) = &self.categoria {
            article.categoria_id = category.id.clone();
            article.categoria_nome = category.nome.clone();
        }
        if let Some(destaque) = self.destaque {
            article.destaque = destaque;
        }
        article.ultima_atualizacao = self.ultima_atualizacao;
    }
}
