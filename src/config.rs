//! 进程配置，启动时从环境变量（以及可选的 `.env` 文件）读取一次

use std::env;

use bcrypt::DEFAULT_COST;

use crate::auth::{MAX_COST, MIN_COST};

/// 未设置 `JWT_SECRET_KEY` 时使用的占位密钥，只能用于开发环境
pub const DEFAULT_JWT_SECRET: &str = "imprensa-dev-secret-change-me";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8001";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET_KEY must be set when IMPRENSA_ENV=production")]
    DefaultSecret,

    #[error("DATABASE_URL not set")]
    MissingDatabaseUrl,

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    /// 覆盖连接串里的数据库名
    pub database_name: Option<String>,
    pub jwt_secret: String,
    /// 为空表示允许任意来源
    pub cors_origins: Vec<String>,
    pub bcrypt_cost: u32,
    pub production: bool,
}

impl Config {
    /// 读取 `.env` 与进程环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 通过 `lookup` 读取每个变量
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let production = lookup("IMPRENSA_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let storage = match lookup("IMPRENSA_STORAGE").as_deref() {
            None | Some("postgres") => StorageKind::Postgres,
            Some("memory") => StorageKind::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "IMPRENSA_STORAGE",
                    value: other.to_string(),
                });
            }
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        if production && jwt_secret == DEFAULT_JWT_SECRET {
            return Err(ConfigError::DefaultSecret);
        }

        let bcrypt_cost = match lookup("IMPRENSA_BCRYPT_COST") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|c| (MIN_COST..=MAX_COST).contains(c))
                .ok_or(ConfigError::Invalid {
                    name: "IMPRENSA_BCRYPT_COST",
                    value: v,
                })?,
            None => DEFAULT_COST,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty() && *o != "*")
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_address: lookup("IMPRENSA_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into()),
            storage,
            database_url,
            database_name: lookup("DB_NAME").filter(|v| !v.is_empty()),
            jwt_secret,
            cors_origins,
            bcrypt_cost,
            production,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}
