use thiserror::Error;

use crate::domain::errors::ItemValidationError;

/// 在庫管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CatalogError {
    /// 備品が見つからない
    #[error("Item not found")]
    ItemNotFound,

    /// 利用者が見つからない
    #[error("User not found")]
    UserNotFound,

    /// フォームバリデーション違反（送信前にブロックされる）
    #[error("Invalid item form: {0}")]
    Validation(String),

    /// BackendGatewayのエラー（ネットワーク/HTTP障害）
    #[error("Backend gateway error")]
    GatewayError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ItemValidationError> for CatalogError {
    fn from(err: ItemValidationError) -> Self {
        let message = match err {
            ItemValidationError::NameRequired => "name is required",
            ItemValidationError::MaxQuantityTooSmall => "max quantity must be at least 1",
            ItemValidationError::CurrentQuantityOutOfRange => {
                "available quantity must be between 0 and max quantity"
            }
        };
        CatalogError::Validation(message.to_string())
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CatalogError>;
