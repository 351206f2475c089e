use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
});

/// 已注册的作者，对外输出时不包含密码哈希
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub nome: String,
    pub created_at: DateTime<Utc>,
}

/// 存储层中的用户记录，带密码哈希
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    #[sqlx(flatten)]
    pub user: User,
    pub password_hash: String,
}

/// `POST /auth/register` 请求体
#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub senha: String,
    pub nome: String,
}

/// `POST /auth/login` 请求体
#[derive(Debug, Deserialize)]
pub struct UserLogin {
    pub email: String,
    pub senha: String,
}

/// 登录成功后的响应
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: User,
}

/// 校验邮箱格式，返回去掉首尾空白后的邮箱
pub fn validate_email(email: &str) -> Result<&str> {
    let email = email.trim();

    if email.is_empty() {
        return Err(Error::Validation("email: não pode ser vazio".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(Error::Validation(format!(
            "email: no máximo {MAX_EMAIL_LENGTH} caracteres"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(Error::Validation("email: formato inválido".to_string()));
    }

    Ok(email)
}
