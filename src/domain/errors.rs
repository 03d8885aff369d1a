#![allow(dead_code)]

use super::LoanStatus;

/// ステータス遷移のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// 遷移表で許可されていない遷移
    InvalidTransition {
        from: Option<LoanStatus>,
        to: LoanStatus,
    },
    /// 現在と同じステータスへの遷移（情報提供のみ、致命的ではない）
    NoOpTransition { status: LoanStatus },
}

/// 備品フォームのバリデーションエラー
///
/// 送信前にクライアント側で検出され、バックエンドへの書き込みをブロックする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    /// 名前が空
    NameRequired,
    /// 最大数量は1以上
    MaxQuantityTooSmall,
    /// 在庫数量が負、または最大数量を超えている
    CurrentQuantityOutOfRange,
}
