use crate::domain::item::{self, Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::value_objects::{ItemId, UserId};
use crate::ports::{BackendGateway, ItemDetail, UploadFile};
use std::sync::Arc;

use super::errors::{CatalogError, Result};

/// 備品一覧を取得する
pub async fn list_items(gateway: &Arc<dyn BackendGateway>) -> Result<Vec<Item>> {
    gateway
        .fetch_items()
        .await
        .map_err(CatalogError::GatewayError)
}

/// 備品1件を貸出履歴付きで取得する
pub async fn get_item(gateway: &Arc<dyn BackendGateway>, item_id: ItemId) -> Result<ItemDetail> {
    gateway
        .fetch_item(item_id)
        .await
        .map_err(CatalogError::GatewayError)?
        .ok_or(CatalogError::ItemNotFound)
}

/// 利用者1件を貸出履歴付きで取得する
pub async fn get_user(gateway: &Arc<dyn BackendGateway>, user_id: UserId) -> Result<User> {
    gateway
        .fetch_user(user_id)
        .await
        .map_err(CatalogError::GatewayError)?
        .ok_or(CatalogError::UserNotFound)
}

/// 備品を新規作成する
///
/// ビジネスルール：
/// - フォームはバックエンドへの書き込み前にバリデーションされる
/// - 画像はオプション（multipartの`file`フィールド）
///
/// 書き込みが失敗してもリトライは行わない（失敗は1回だけ報告される）。
pub async fn create_item(
    gateway: &Arc<dyn BackendGateway>,
    draft: ItemDraft,
    image: Option<UploadFile>,
) -> Result<()> {
    item::validate_draft(&draft)?;

    gateway
        .create_item(&draft, image.as_ref())
        .await
        .map_err(CatalogError::GatewayError)
}

/// 備品を更新する
///
/// 数量フィールド（max/current）は作成後読み取り専用：編集フォームは
/// 既存値をそのまま送る。数量の増減は貸出の承認・返却に伴う
/// バックエンド側の副作用としてのみ発生する。
pub async fn update_item(
    gateway: &Arc<dyn BackendGateway>,
    item_id: ItemId,
    draft: ItemDraft,
    image: Option<UploadFile>,
) -> Result<()> {
    item::validate_draft(&draft)?;

    gateway
        .update_item(item_id, &draft, image.as_ref())
        .await
        .map_err(CatalogError::GatewayError)
}

/// 備品画像のみを差し替える
pub async fn update_item_image(
    gateway: &Arc<dyn BackendGateway>,
    item_id: ItemId,
    image: UploadFile,
) -> Result<()> {
    gateway
        .update_item_image(item_id, &image)
        .await
        .map_err(CatalogError::GatewayError)
}
