use std::sync::Arc;

use crate::{
    articles::ArticleRepository,
    auth::{Accounts, PasswordHasher, TokenService},
    storage::Store,
};

/// 应用程序上下文
///
/// [`AppState`] 封装了存储、令牌服务和密码哈希配置，启动时构造一次，
/// 由每个请求共享。
#[derive(Clone)]
pub struct AppState<S> {
    store: S,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
}

impl<S: Store> AppState<S> {
    /// 创建一个新的 [`AppState`] 实例
    pub fn new(store: S, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            hasher,
        }
    }

    /// 获取存储对象
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 获取令牌服务
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// 文章相关操作
    pub fn articles(&self) -> ArticleRepository<'_, S> {
        ArticleRepository::new(&self.store)
    }

    /// 注册与登录
    pub fn accounts(&self) -> Accounts<'_, S> {
        Accounts::new(&self.store, &self.tokens, self.hasher.clone())
    }
}
