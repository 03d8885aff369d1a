#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, ItemId, Quantity, TransitionError, UserId};

// ============================================================================
// ステータスライフサイクル
// ============================================================================

/// 貸出リクエストのステータス
///
/// ライフサイクル：pending → approved/rejected → completed
/// rejected と completed は終端状態（以後の遷移は不可）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 申請中
    Pending,
    /// 承認済み（貸出中）
    Approved,
    /// 却下（終端）
    Rejected,
    /// 返却完了（終端）
    Completed,
}

impl LoanStatus {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Completed => "completed",
        }
    }

    /// 終端状態か（これ以上の遷移が許可されないか）
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Completed)
    }

    /// 遷移表：現在のステータスから`to`への遷移が許可されているか
    ///
    /// | from      | to allowed                   |
    /// |-----------|------------------------------|
    /// | pending   | pending, approved, rejected  |
    /// | approved  | approved, completed          |
    /// | rejected  | rejected のみ（no-op）       |
    /// | completed | completed のみ（no-op）      |
    pub fn allows(&self, to: LoanStatus) -> bool {
        match self {
            LoanStatus::Pending => matches!(
                to,
                LoanStatus::Pending | LoanStatus::Approved | LoanStatus::Rejected
            ),
            LoanStatus::Approved => matches!(to, LoanStatus::Approved | LoanStatus::Completed),
            LoanStatus::Rejected => matches!(to, LoanStatus::Rejected),
            LoanStatus::Completed => matches!(to, LoanStatus::Completed),
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(LoanStatus::Pending),
            "approved" => Ok(LoanStatus::Approved),
            "rejected" => Ok(LoanStatus::Rejected),
            "completed" => Ok(LoanStatus::Completed),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

/// ステータス絞り込み条件
///
/// `All`は絞り込みなし。`Only`は完全一致でフィルタリングする。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Only(LoanStatus),
}

impl StatusFilter {
    /// レコードのステータスが条件に合致するか
    ///
    /// ステータスを持たないレコードは`Only`には決して合致しない。
    pub fn matches(&self, status: Option<LoanStatus>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => status == Some(*wanted),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse::<LoanStatus>().map(StatusFilter::Only),
        }
    }
}

// ============================================================================
// 貸出イベント集約
// ============================================================================

/// 貸出明細 - 1件の貸出リクエストに含まれる備品1種
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanLine {
    pub item_id: ItemId,
    pub name: String,
    pub quantity: Quantity,
    pub image_url: Option<String>,
}

/// 貸出イベント集約 - 1件の貸出リクエスト
///
/// バックエンドから取得したスナップショットの1レコード。
/// ワイヤーデータは欠損し得るため、表示用フィールドはOptionで保持する。
/// `event_id`と`created_at`は作成後不変。明細（items）もこの層からは編集不可。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanEvent {
    // 識別子
    pub event_id: EventId,

    // 借り手への参照（表示名は非正規化）
    pub user_id: UserId,
    pub user_name: Option<String>,

    // ライフサイクル管理の責務
    pub created_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub status: Option<LoanStatus>,

    // 貸出明細（作成後不変）
    pub items: Vec<LoanLine>,
}

/// 純粋関数：貸出ステータスを遷移させる
///
/// ビジネスルール：
/// - 終端状態（rejected, completed）からの変更は不可
/// - 現在と同じステータスへの遷移はno-op（情報提供のみ）
/// - それ以外は遷移表で許可された遷移のみ受け付ける
/// - 成功時は`approved_at`を遷移時刻で更新する（初回だけでなく毎回）
///
/// ステータス不明のレコードは遷移できない。
///
/// 副作用なし。更新後のLoanEventを返す。
pub fn transition(
    loan: &LoanEvent,
    requested: LoanStatus,
    now: DateTime<Utc>,
) -> Result<LoanEvent, TransitionError> {
    // バリデーション：現在のステータスが不明なレコードは遷移不可
    let Some(current) = loan.status else {
        return Err(TransitionError::InvalidTransition {
            from: None,
            to: requested,
        });
    };

    // バリデーション：終端状態からの変更は不可
    if current.is_terminal() && requested != current {
        return Err(TransitionError::InvalidTransition {
            from: Some(current),
            to: requested,
        });
    }

    // バリデーション：同一ステータスへの遷移はno-op
    if requested == current {
        return Err(TransitionError::NoOpTransition { status: current });
    }

    // バリデーション：遷移表で許可されているか
    if !current.allows(requested) {
        return Err(TransitionError::InvalidTransition {
            from: Some(current),
            to: requested,
        });
    }

    // 新しいLoanEventを生成
    Ok(LoanEvent {
        status: Some(requested),
        approved_at: Some(now),
        ..loan.clone()
    })
}
