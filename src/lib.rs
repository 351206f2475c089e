pub mod api;
pub mod articles;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod state;
pub mod storage;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use auth::{PasswordHasher, TokenService};
use config::{Config, StorageKind};
use error::{Error, Result};
use state::AppState;
use storage::{MemoryStore, Store};

/// 启动服务
///
/// 读取配置、连接存储、写入种子分类，然后运行 HTTP 服务直到收到退出信号。
pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("IMPRENSA_LOG"))
        .init();

    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(%e, "invalid configuration");
    })?;

    if config.uses_default_secret() {
        tracing::warn!(
            "JWT_SECRET_KEY not set, signing tokens with the development placeholder; \
             never run like this in production"
        );
    }

    match config.storage {
        StorageKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(Error::Config(config::ConfigError::MissingDatabaseUrl))?;
            let db = storage::init_db(url, config.database_name.as_deref()).await?;
            storage::migrate(&db, storage::SCHEMA).await?;

            let result = serve(db.clone(), &config).await;

            db.close().await;
            tracing::info!("database connections closed");
            result
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage, data is lost on exit");
            serve(MemoryStore::new(), &config).await
        }
    }
}

async fn serve<S: Store>(store: S, config: &Config) -> Result<()> {
    storage::seed_categories(&store).await?;

    let app = AppState::new(
        store,
        TokenService::new(&config.jwt_secret),
        PasswordHasher::new(config.bcrypt_cost),
    );

    api::run_server(app, &config.bind_address, &config.cors_origins).await
}
