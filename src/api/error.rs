use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::catalog::CatalogError;
use crate::application::loan::LoanAdminError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
/// どのエラーもプロセスを停止させない。
#[derive(Debug)]
pub enum ApiError {
    Loan(LoanAdminError),
    Catalog(CatalogError),
    BadRequest(String),
}

impl From<LoanAdminError> for ApiError {
    fn from(err: LoanAdminError) -> Self {
        ApiError::Loan(err)
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 400 Bad Request - パラメータ不正
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),

            // 404 Not Found - リクエストされたリソースが存在しない
            ApiError::Loan(LoanAdminError::LoanNotFound) => (
                StatusCode::NOT_FOUND,
                "LOAN_NOT_FOUND",
                "Loan not found".to_string(),
            ),
            ApiError::Catalog(CatalogError::ItemNotFound) => (
                StatusCode::NOT_FOUND,
                "ITEM_NOT_FOUND",
                "Item not found".to_string(),
            ),
            ApiError::Catalog(CatalogError::UserNotFound) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "User not found".to_string(),
            ),

            // 422 Unprocessable Entity - ビジネスルール違反
            ApiError::Loan(LoanAdminError::InvalidTransition(detail)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_TRANSITION",
                format!("Status cannot be changed: {}", detail),
            ),
            ApiError::Loan(LoanAdminError::StatusUnchanged(status)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "STATUS_UNCHANGED",
                format!("The status remains {}", status),
            ),
            ApiError::Catalog(CatalogError::Validation(detail)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", detail)
            }

            // 502 Bad Gateway - バックエンド障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Loan(LoanAdminError::GatewayError(ref e)) => {
                tracing::error!("Backend gateway error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The inventory backend could not be reached".to_string(),
                )
            }
            ApiError::Catalog(CatalogError::GatewayError(ref e)) => {
                tracing::error!("Backend gateway error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "BACKEND_UNAVAILABLE",
                    "The inventory backend could not be reached".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
