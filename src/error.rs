use std::io;

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{auth::AuthError, config::ConfigError};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Artigo não encontrado")]
    ArticleNotFound,

    #[error("Categoria não encontrada")]
    CategoryNotFound,

    #[error("Email já cadastrado")]
    EmailTaken,

    #[error("Já existe um artigo com este slug")]
    SlugTaken,

    #[error("Email ou senha incorretos")]
    InvalidCredentials,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for Error {
    fn from(e: MultipartError) -> Self {
        Error::Validation(e.body_text())
    }
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ArticleNotFound | Error::CategoryNotFound => StatusCode::NOT_FOUND,
            Error::EmailTaken => StatusCode::BAD_REQUEST,
            Error::SlugTaken => StatusCode::CONFLICT,
            Error::InvalidCredentials | Error::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        let detail = if status.is_server_error() {
            match &self {
                Error::Sqlx(e) => tracing::error!(%e, "sqlx error"),
                Error::Password(e) => tracing::error!(%e, "password hashing error"),
                Error::Token(e) => tracing::error!(%e, "token signing error"),
                e => tracing::error!(%e, "internal error"),
            }
            "Internal Server Error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
