use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanAdminError {
    /// 貸出が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 遷移表で許可されていないステータス遷移
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// 現在と同じステータスへの遷移（致命的ではない、情報提供のみ）
    #[error("Status unchanged: {0}")]
    StatusUnchanged(String),

    /// BackendGatewayのエラー（ネットワーク/HTTP障害）
    #[error("Backend gateway error")]
    GatewayError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanAdminError>;
