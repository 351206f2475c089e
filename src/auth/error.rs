use jsonwebtoken::errors::ErrorKind;

/// 身份认证失败，统一映射为 401
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Não autenticado")]
    MissingToken,

    #[error("Token expirado")]
    TokenExpired,

    #[error("Token inválido")]
    TokenInvalid,

    #[error("Usuário não encontrado")]
    UserNotFound,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}
