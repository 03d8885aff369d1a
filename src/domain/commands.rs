use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, LoanStatus};

/// コマンド：貸出ステータスを更新する
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateLoanStatus {
    pub event_id: EventId,
    pub status: LoanStatus,
    pub requested_at: DateTime<Utc>,
}
