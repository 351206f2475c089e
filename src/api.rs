mod articles;
mod auth;
mod json;
mod upload;

use axum::{Router, http::HeaderValue};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::instrument;

use crate::{error::Result, state::AppState, storage::Store};

pub use self::json::AppJson;

/// 设置应用的路由。
///
/// 将 `/api` 下的认证、文章和图片上传接口组合在一起，并绑定应用状态。
pub fn setup_route<S: Store>(app: AppState<S>) -> Router {
    Router::new()
        .nest(
            "/api",
            auth::setup_route()
                .merge(articles::setup_route())
                .merge(upload::setup_route()),
        )
        .with_state(app)
}

/// 启动 HTTP 服务，并使用给定的路由处理请求。
///
/// 收到 Ctrl-C 或 SIGTERM 后停止接收新连接，等待进行中的请求结束后返回。
#[instrument(name = "http server", skip(router))]
pub async fn run_server_with_router(router: Router, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;

    tracing::info!("listening on {bind_address}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("http server stopped");
    Ok(())
}

/// 启动 HTTP 服务，自动设置路由和中间件。
///
/// 1. 生成路由
/// 2. 添加追踪和跨域中间件
/// 3. 启动服务器
pub async fn run_server<S: Store>(
    app: AppState<S>,
    bind_address: &str,
    cors_origins: &[String],
) -> Result<()> {
    let router = setup_route(app);
    let router = add_middlewares(router, cors_origins);
    run_server_with_router(router, bind_address).await
}

/// 为路由添加中间件，包括请求追踪、失败日志记录和跨域策略。
///
/// 日志记录会在请求失败时输出错误信息。
fn add_middlewares(router: Router, cors_origins: &[String]) -> Router {
    fn log_failure(
        err: tower_http::classify::ServerErrorsFailureClass,
        _latency: std::time::Duration,
        _span: &tracing::Span,
    ) {
        tracing::error!(error = %err, "request failed");
    }

    router.layer(cors_layer(cors_origins)).layer(
        TraceLayer::new_for_http()
            .on_failure(log_failure)
            .on_request(|_req: &_, _span: &tracing::Span| {
                // 空实现，关闭请求日志
            }),
    )
}

/// 按配置的来源构建跨域策略，列表为空时允许任意来源
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins = origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|e| tracing::warn!(%e, %origin, "ignoring invalid CORS origin"))
                .ok()
        })
        .collect::<Vec<_>>();

    layer.allow_origin(AllowOrigin::list(origins))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(%e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(%e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
