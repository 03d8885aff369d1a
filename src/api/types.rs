use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::loan::{LoanPage, Notice, RefreshOutcome};
use crate::domain::item::{Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::{LoanEvent, LoanLine};
use crate::ports::ItemDetail;

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// 借り手名の部分一致検索
    pub search: Option<String>,
    /// ステータスでフィルタリング（all, pending, approved, rejected, completed）
    pub status: Option<String>,
    /// 申請日でフィルタリング（YYYY-MM-DD）
    pub date: Option<String>,
    /// 1始まりのページ番号（デフォルト1）
    pub page: Option<i64>,
    /// 1ページあたりの件数（デフォルト10）
    pub page_size: Option<usize>,
}

/// 貸出明細レスポンス
#[derive(Debug, Serialize)]
pub struct LoanLineResponse {
    pub item_id: i64,
    pub name: String,
    pub quantity: u32,
    pub image_url: Option<String>,
}

impl From<&LoanLine> for LoanLineResponse {
    fn from(line: &LoanLine) -> Self {
        Self {
            item_id: line.item_id.value(),
            name: line.name.clone(),
            quantity: line.quantity.value(),
            image_url: line.image_url.clone(),
        }
    }
}

/// 貸出レスポンス
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub event_id: i64,
    pub user_id: i64,
    pub user_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub items: Vec<LoanLineResponse>,
}

impl From<&LoanEvent> for LoanResponse {
    fn from(loan: &LoanEvent) -> Self {
        Self {
            event_id: loan.event_id.value(),
            user_id: loan.user_id.value(),
            user_name: loan.user_name.clone(),
            created_at: loan.created_at,
            approved_at: loan.approved_at,
            status: loan.status.map(|s| s.as_str().to_string()),
            items: loan.items.iter().map(LoanLineResponse::from).collect(),
        }
    }
}

/// 貸出一覧レスポンス（GET /loans）
#[derive(Debug, Serialize)]
pub struct LoanListResponse {
    pub loans: Vec<LoanResponse>,
    /// 絞り込み後の総件数
    pub total: usize,
    pub page: i64,
    pub page_size: usize,
    pub total_pages: usize,
}

impl From<LoanPage> for LoanListResponse {
    fn from(page: LoanPage) -> Self {
        let total_pages = if page.page_size == 0 {
            1
        } else {
            usize::max(1, page.total.div_ceil(page.page_size))
        };
        Self {
            loans: page.loans.iter().map(LoanResponse::from).collect(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages,
        }
    }
}

/// 再取得レスポンス（POST /loans/refresh）
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub loaded: usize,
    pub superseded: bool,
    /// 利用者に提示する非致命的な通知
    pub notices: Vec<String>,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        Self {
            loaded: outcome.loaded,
            superseded: outcome.superseded,
            notices: outcome.notices.iter().map(Notice::to_string).collect(),
        }
    }
}

/// ステータス更新リクエスト（PUT /loans/:id/status）
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// 備品レスポンス
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub bookmarks: bool,
    pub max_quantity: u32,
    pub current_quantity: u32,
}

impl From<&Item> for ItemResponse {
    fn from(item: &Item) -> Self {
        Self {
            item_id: item.item_id.value(),
            name: item.name.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
            bookmarks: item.bookmarks,
            max_quantity: item.max_quantity,
            current_quantity: item.current_quantity,
        }
    }
}

/// 備品詳細レスポンス（貸出履歴付き）
#[derive(Debug, Serialize)]
pub struct ItemDetailResponse {
    pub item: ItemResponse,
    pub borrow_history: Vec<LoanResponse>,
}

impl From<&ItemDetail> for ItemDetailResponse {
    fn from(detail: &ItemDetail) -> Self {
        Self {
            item: ItemResponse::from(&detail.item),
            borrow_history: detail
                .borrow_history
                .iter()
                .map(LoanResponse::from)
                .collect(),
        }
    }
}

/// 利用者レスポンス（貸出履歴付き）
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub name: String,
    pub major: Option<String>,
    pub student_id: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub events: Vec<LoanResponse>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.user_id.value(),
            name: user.name.clone(),
            major: user.major.clone(),
            student_id: user.student_id.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            events: user.events.iter().map(LoanResponse::from).collect(),
        }
    }
}

/// 備品フォームのペイロード（multipartの`itemData`フィールド）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFormPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub max_quantity: u32,
    #[serde(default)]
    pub current_quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<ItemFormPayload> for ItemDraft {
    fn from(payload: ItemFormPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            category: payload.category,
            max_quantity: payload.max_quantity,
            current_quantity: payload.current_quantity,
            image_url: payload.image_url,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}
