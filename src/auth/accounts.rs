use super::{PasswordHasher, TokenService};
use crate::{
    content::{LoginResponse, User, UserCreate, UserLogin, UserRecord, new_id, now, validate_email},
    error::{Error, Result},
    storage::Store,
};

/// 注册与登录
///
/// bcrypt 计算放到阻塞线程池执行，避免占用异步工作线程。
pub struct Accounts<'a, S> {
    store: &'a S,
    tokens: &'a TokenService,
    hasher: PasswordHasher,
}

impl<'a, S: Store> Accounts<'a, S> {
    pub fn new(store: &'a S, tokens: &'a TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    /// 注册新用户
    ///
    /// 邮箱已被占用时返回 [`Error::EmailTaken`]，不会写入任何记录。
    pub async fn register(&self, input: UserCreate) -> Result<User> {
        let email = validate_email(&input.email)?.to_string();

        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(Error::EmailTaken);
        }

        let hasher = self.hasher.clone();
        let senha = input.senha;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&senha)).await??;

        let record = UserRecord {
            user: User {
                id: new_id(),
                email,
                nome: input.nome,
                created_at: now(),
            },
            password_hash,
        };

        self.store.insert_user(&record).await?;
        tracing::info!(user = %record.user.id, "user registered");

        Ok(record.user)
    }

    /// 校验邮箱和密码并签发令牌
    ///
    /// 邮箱不存在和密码错误返回同一个错误，耗时也相同。
    pub async fn login(&self, input: UserLogin) -> Result<LoginResponse> {
        let email = validate_email(&input.email)?;

        let hasher = self.hasher.clone();
        let senha = input.senha;

        let Some(record) = self.store.find_user_by_email(email).await? else {
            tokio::task::spawn_blocking(move || hasher.verify_decoy(&senha)).await?;
            return Err(Error::InvalidCredentials);
        };

        let hash = record.password_hash;
        let matched = tokio::task::spawn_blocking(move || hasher.verify(&senha, &hash)).await?;

        if !matched {
            return Err(Error::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&record.user.id)?;

        Ok(LoginResponse {
            access_token,
            token_type: "bearer",
            user: record.user,
        })
    }
}
