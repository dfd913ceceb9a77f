//! Errors raised while constructing or validating fundamental types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TypesError {
    #[error("invalid principal: {0:?}")]
    InvalidPrincipal(String),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),
}
