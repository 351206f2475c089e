mod accounts;
mod error;
mod identity;
mod password;
mod token;

pub use self::{
    accounts::Accounts,
    error::AuthError,
    identity::{AuthUser, resolve},
    password::{MAX_COST, MIN_COST, PasswordHasher},
    token::{Claims, TOKEN_LIFETIME_DAYS, TokenService},
};
