use serde::{Deserialize, Serialize};

use super::{derive_slug, new_id};

/// 首次启动时写入的固定分类
pub const SEED_CATEGORIES: [&str; 5] = ["Política", "Economia", "Tecnologia", "Esportes", "Cultura"];

/// 文章分类，只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: String,
    pub nome: String,
    pub slug: String,
}

impl Category {
    /// 以名称创建分类，slug 由名称推导
    pub fn new(nome: impl Into<String>) -> Self {
        let nome = nome.into();
        Self {
            id: new_id(),
            slug: derive_slug(&nome),
            nome,
        }
    }

    /// 全部种子分类
    pub fn seeds() -> Vec<Category> {
        SEED_CATEGORIES.iter().map(|nome| Category::new(*nome)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_slugs() {
        let slugs: Vec<_> = Category::seeds().into_iter().map(|c| c.slug).collect();
        assert_eq!(slugs, ["politica", "economia", "tecnologia", "esportes", "cultura"]);
    }

    #[test]
    fn test_seed_ids_are_unique() {
        let seeds = Category::seeds();
        let mut ids: Vec<_> = seeds.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SEED_CATEGORIES.len());
    }
}
