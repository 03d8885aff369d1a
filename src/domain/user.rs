#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::{LoanEvent, UserId};

/// 利用者プロフィール（貸出履歴付き）
///
/// `GET /user/{id}`が返す、貸出履歴を埋め込んだ利用者レコード。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub major: Option<String>,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    /// この利用者の貸出履歴
    pub events: Vec<LoanEvent>,
}
