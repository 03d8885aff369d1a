#![allow(dead_code)]

use serde::{Deserialize, Serialize};

use super::{ItemId, ItemValidationError};

/// 備品レコード（在庫管理コンテキスト）
///
/// `max_quantity`と`current_quantity`は作成時に確定し、以後この層からは
/// 読み取り専用。数量の増減は貸出の承認・返却に伴うバックエンド側の
/// 副作用としてのみ発生する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub bookmarks: bool,
    pub max_quantity: u32,
    pub current_quantity: u32,
}

/// 備品フォームの入力値
///
/// 作成・更新フォームから送信されるペイロード。バックエンドへの
/// 書き込み前にクライアント側でバリデーションされる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub max_quantity: u32,
    pub current_quantity: u32,
    pub image_url: Option<String>,
}

/// 純粋関数：備品フォームをバリデーションする
///
/// ビジネスルール：
/// - 名前は必須（空白のみは不可）
/// - 最大数量は1以上
/// - 在庫数量は0以上かつ最大数量以下
///
/// 違反があった場合、リクエストは送信前にブロックされる。
pub fn validate_draft(draft: &ItemDraft) -> Result<(), ItemValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ItemValidationError::NameRequired);
    }

    if draft.max_quantity < 1 {
        return Err(ItemValidationError::MaxQuantityTooSmall);
    }

    if draft.current_quantity > draft.max_quantity {
        return Err(ItemValidationError::CurrentQuantityOutOfRange);
    }

    Ok(())
}
