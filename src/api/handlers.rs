use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use std::sync::Arc;

use crate::application::catalog;
use crate::application::loan::{
    LoanFilter, ServiceDependencies, query_loans, refresh_loans, update_loan_status,
};
use crate::domain::commands::UpdateLoanStatus;
use crate::domain::item::ItemDraft;
use crate::domain::value_objects::{EventId, ItemId, UserId};
use crate::domain::{LoanStatus, StatusFilter};
use crate::ports::UploadFile;

use super::error::ApiError;
use super::types::{
    ItemDetailResponse, ItemFormPayload, ItemResponse, ListLoansQuery, LoanListResponse,
    LoanResponse, RefreshResponse, UpdateStatusRequest, UserResponse,
};

/// 1ページあたりのデフォルト件数
const DEFAULT_PAGE_SIZE: usize = 10;

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Loan handlers
// ============================================================================

/// GET /loans - 絞り込み・ページネーション付き貸出一覧
///
/// クエリパラメータ:
/// - search: 借り手名の部分一致（大文字小文字を区別しない）
/// - status: ステータス完全一致（all, pending, approved, rejected, completed）
/// - date: 申請日のカレンダー日付一致（YYYY-MM-DD）
/// - page, page_size: 1始まりのページ指定
///
/// 条件はANDで合成される。絞り込み条件が指定されてpageが省略された
/// 場合は1ページ目に戻る。
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<LoanListResponse>, ApiError> {
    let status = match &query.status {
        Some(raw) => raw.parse::<StatusFilter>().map_err(ApiError::BadRequest)?,
        None => StatusFilter::All,
    };

    let date = match &query.date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| ApiError::BadRequest(format!("Invalid date: {}", raw)))?,
        ),
        None => None,
    };

    let filter = LoanFilter {
        search: query.search.unwrap_or_default(),
        status,
        date,
    };

    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let result = query_loans(&state.service_deps, &filter, page, page_size).await;
    Ok(Json(LoanListResponse::from(result)))
}

/// POST /loans/refresh - 貸出スナップショットをバックエンドから再取得
///
/// 取得の失敗は致命的ではない：空データや輸送層の失敗は通知として
/// レスポンスに含まれ、ステータスは常に200。
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let outcome = refresh_loans(&state.service_deps).await;
    Json(RefreshResponse::from(outcome))
}

/// PUT /loans/:id/status - 貸出ステータスを更新
///
/// 強制されるビジネスルール:
/// - 遷移表で許可された遷移のみ受け付ける
/// - 終端状態（rejected, completed）からの変更は不可
/// - 同一ステータスへの変更はno-opとして422で報告される
///
/// ローカルのスナップショットを楽観的に更新し、バックエンドへの
/// 書き込みが失敗した場合は巻き戻す。
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<LoanResponse>, ApiError> {
    let status = req
        .status
        .parse::<LoanStatus>()
        .map_err(ApiError::BadRequest)?;

    let cmd = UpdateLoanStatus {
        event_id: EventId::new(event_id),
        status,
        requested_at: chrono::Utc::now(),
    };

    let updated = update_loan_status(&state.service_deps, cmd).await?;
    Ok(Json(LoanResponse::from(&updated)))
}

// ============================================================================
// Item handlers
// ============================================================================

/// GET /items - 備品一覧
pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = catalog::list_items(&state.service_deps.gateway).await?;
    Ok(Json(items.iter().map(ItemResponse::from).collect()))
}

/// GET /items/:id - 備品詳細（貸出履歴付き）
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
) -> Result<Json<ItemDetailResponse>, ApiError> {
    let detail = catalog::get_item(&state.service_deps.gateway, ItemId::new(item_id)).await?;
    Ok(Json(ItemDetailResponse::from(&detail)))
}

/// POST /items - 備品作成（multipart: itemData + 任意のfile）
///
/// フォームはバックエンドへの転送前にバリデーションされ、違反が
/// あればリクエストはブロックされる。
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let (draft, image) = read_item_form(multipart).await?;
    catalog::create_item(&state.service_deps.gateway, draft, image).await?;
    Ok(StatusCode::CREATED)
}

/// PUT /items/:id - 備品更新（multipart、作成と同じ形式）
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let (draft, image) = read_item_form(multipart).await?;
    catalog::update_item(&state.service_deps.gateway, ItemId::new(item_id), draft, image).await?;
    Ok(StatusCode::OK)
}

/// PUT /items/:id/image - 備品画像のみを差し替え
pub async fn update_item_image(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<i64>,
    multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let (_, image) = read_multipart(multipart).await?;
    let image =
        image.ok_or_else(|| ApiError::BadRequest("file field is required".to_string()))?;
    catalog::update_item_image(&state.service_deps.gateway, ItemId::new(item_id), image).await?;
    Ok(StatusCode::OK)
}

// ============================================================================
// User handlers
// ============================================================================

/// GET /users/:id - 利用者プロフィール（貸出履歴付き）
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = catalog::get_user(&state.service_deps.gateway, UserId::new(user_id)).await?;
    Ok(Json(UserResponse::from(&user)))
}

// ============================================================================
// Multipart helpers
// ============================================================================

/// multipartフォームから`itemData`と任意の`file`を読み出す
async fn read_item_form(multipart: Multipart) -> Result<(ItemDraft, Option<UploadFile>), ApiError> {
    let (payload, image) = read_multipart(multipart).await?;
    let payload =
        payload.ok_or_else(|| ApiError::BadRequest("itemData field is required".to_string()))?;
    Ok((ItemDraft::from(payload), image))
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Option<ItemFormPayload>, Option<UploadFile>), ApiError> {
    let mut payload = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("itemData") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid itemData field: {}", e)))?;
                let parsed: ItemFormPayload = serde_json::from_str(&text)
                    .map_err(|e| ApiError::BadRequest(format!("Invalid itemData JSON: {}", e)))?;
                payload = Some(parsed);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file field: {}", e)))?;
                image = Some(UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            // 未知のフィールドは無視する
            _ => {}
        }
    }

    Ok((payload, image))
}
