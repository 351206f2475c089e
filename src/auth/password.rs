use std::sync::{Arc, OnceLock};

use bcrypt::BcryptError;

/// bcrypt 允许的最小 cost
pub const MIN_COST: u32 = 4;
/// bcrypt 允许的最大 cost
pub const MAX_COST: u32 = 31;

const DECOY_PASSWORD: &str = "imprensa-decoy";

/// bcrypt 密码哈希
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// 与真实哈希同 cost 的占位哈希，首次使用时生成
    decoy: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: Arc::default(),
        }
    }

    /// 生成带盐的哈希
    pub fn hash(&self, password: &str) -> Result<String, BcryptError> {
        bcrypt::hash(password, self.cost)
    }

    /// 校验密码，哈希格式错误时返回 `false`
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// 用户不存在时调用，耗时与 [`verify`](Self::verify) 相同，结果总是 `false`
    pub fn verify_decoy(&self, password: &str) -> bool {
        let decoy = self
            .decoy
            .get_or_init(|| self.hash(DECOY_PASSWORD).unwrap_or_default());
        let _ = self.verify(password, decoy);
        false
    }
}
