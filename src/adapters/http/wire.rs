#![allow(dead_code)]

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::item::{Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::value_objects::{EventId, ItemId, Quantity, UserId};
use crate::domain::{LoanEvent, LoanLine, LoanStatus};

// ============================================================================
// ワイヤーレコード（バックエンドのJSON表現）
// ============================================================================

/// 貸出明細のワイヤーレコード
#[derive(Debug, Clone, Deserialize)]
pub struct LoanLineRecord {
    #[serde(rename = "ItemID")]
    pub item_id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Quantity", default)]
    pub quantity: u32,
    #[serde(rename = "ImageUrl", default)]
    pub image_url: Option<String>,
}

/// 貸出イベントのワイヤーレコード
///
/// バックエンドのレスポンスはフィールドが欠損し得るため、
/// 識別子以外はすべてオプションとして受ける。
#[derive(Debug, Clone, Deserialize)]
pub struct LoanEventRecord {
    #[serde(rename = "EventID")]
    pub event_id: i64,
    #[serde(rename = "UserID", default)]
    pub user_id: i64,
    #[serde(rename = "UserName", default)]
    pub user_name: Option<String>,
    #[serde(rename = "CreatedAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "ApprovedAt", default)]
    pub approved_at: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Loan", default)]
    pub loan: Vec<LoanLineRecord>,
}

/// 備品のワイヤーレコード
#[derive(Debug, Clone, Deserialize)]
pub struct ItemRecord {
    #[serde(rename = "ItemID", alias = "ID")]
    pub item_id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "ImageUrl", default)]
    pub image_url: Option<String>,
    #[serde(rename = "Bookmarks", default)]
    pub bookmarks: bool,
    #[serde(rename = "MaxQuantity", default)]
    pub max_quantity: u32,
    #[serde(rename = "CurrentQuantity", default)]
    pub current_quantity: u32,
}

/// 備品詳細のワイヤーレコード（貸出履歴付き）
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDetailRecord {
    #[serde(rename = "item")]
    pub item: ItemRecord,
    #[serde(rename = "Event", default, alias = "borrowHistory")]
    pub events: Vec<LoanEventRecord>,
}

/// 利用者のワイヤーレコード（貸出履歴付き）
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Major", default)]
    pub major: Option<String>,
    #[serde(rename = "StudentID", default)]
    pub student_id: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "AvatarUrl", default)]
    pub avatar_url: Option<String>,
    #[serde(rename = "Event", default)]
    pub events: Vec<LoanEventRecord>,
}

/// 備品フォームの書き込みペイロード（multipartの`itemData`フィールド）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDataPayload {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub max_quantity: u32,
    pub current_quantity: u32,
    pub image_url: Option<String>,
}

impl From<&ItemDraft> for ItemDataPayload {
    fn from(draft: &ItemDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
            category: draft.category.clone(),
            max_quantity: draft.max_quantity,
            current_quantity: draft.current_quantity,
            image_url: draft.image_url.clone(),
        }
    }
}

/// ステータス書き込みペイロード
#[derive(Debug, Clone, Serialize)]
pub struct StatusPayload {
    #[serde(rename = "Status")]
    pub status: &'static str,
}

// ============================================================================
// 寛容な変換
// ============================================================================

/// タイムスタンプ文字列を寛容にパースする
///
/// RFC 3339を優先し、タイムゾーンなしの形式もいくつか受け付ける。
/// パースできない値は`None`（日付フィルタに決して合致しない）。
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    None
}

impl LoanEventRecord {
    /// ドメインのLoanEventへ変換する
    ///
    /// 不明なステータス・不正なタイムスタンプ・数量0の明細は
    /// エラーにせず落とす（表示・フィルタの対象から外れる）。
    pub fn into_domain(self) -> LoanEvent {
        let status = self.status.as_deref().and_then(|s| match s.parse::<LoanStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                tracing::debug!("unknown loan status in event {}: {}", self.event_id, s);
                None
            }
        });

        let items = self
            .loan
            .into_iter()
            .filter_map(|line| {
                let quantity = Quantity::try_from(line.quantity).ok()?;
                Some(LoanLine {
                    item_id: ItemId::new(line.item_id),
                    name: line.name,
                    quantity,
                    image_url: line.image_url,
                })
            })
            .collect();

        LoanEvent {
            event_id: EventId::new(self.event_id),
            user_id: UserId::new(self.user_id),
            user_name: self.user_name,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            approved_at: self.approved_at.as_deref().and_then(parse_timestamp),
            status,
            items,
        }
    }
}

impl ItemRecord {
    pub fn into_domain(self) -> Item {
        Item {
            item_id: ItemId::new(self.item_id),
            name: self.name,
            description: self.description,
            category: self.category,
            image_url: self.image_url,
            bookmarks: self.bookmarks,
            max_quantity: self.max_quantity,
            current_quantity: self.current_quantity,
        }
    }
}

impl UserRecord {
    pub fn into_domain(self) -> User {
        User {
            user_id: UserId::new(self.user_id),
            name: self.name,
            major: self.major,
            student_id: self.student_id,
            email: self.email,
            avatar_url: self.avatar_url,
            events: self.events.into_iter().map(|e| e.into_domain()).collect(),
        }
    }
}

/// 純粋関数：`GET /event`のレスポンスボディを貸出イベント列に変換する
///
/// - `null`や配列以外のボディは0件として扱う（エラーにしない）
/// - 配列内のデシリアライズできない要素はスキップする
pub fn coerce_loan_events(body: Value) -> Vec<LoanEvent> {
    let Value::Array(entries) = body else {
        if !body.is_null() {
            tracing::warn!("event endpoint returned a non-array body, treating as no data");
        }
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<LoanEventRecord>(entry) {
            Ok(record) => Some(record.into_domain()),
            Err(e) => {
                tracing::warn!("skipping malformed loan event record: {}", e);
                None
            }
        })
        .collect()
}

/// 純粋関数：`GET /admin/item`のレスポンスボディを備品列に変換する
pub fn coerce_items(body: Value) -> Vec<Item> {
    let Value::Array(entries) = body else {
        if !body.is_null() {
            tracing::warn!("item endpoint returned a non-array body, treating as no data");
        }
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<ItemRecord>(entry) {
            Ok(record) => Some(record.into_domain()),
            Err(e) => {
                tracing::warn!("skipping malformed item record: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // TDD: coerce_loan_events() のテスト
    #[test]
    fn test_coerce_null_body_yields_empty_list() {
        assert!(coerce_loan_events(Value::Null).is_empty());
    }

    #[test]
    fn test_coerce_non_array_body_yields_empty_list() {
        assert!(coerce_loan_events(json!({"message": "oops"})).is_empty());
        assert!(coerce_loan_events(json!("nothing")).is_empty());
    }

    #[test]
    fn test_coerce_parses_well_formed_records() {
        let body = json!([{
            "EventID": 7,
            "UserID": 3,
            "UserName": "Alice",
            "CreatedAt": "2025-05-01T09:30:00Z",
            "ApprovedAt": null,
            "Status": "pending",
            "Loan": [{"ItemID": 1, "Name": "Hammer", "Quantity": 2}]
        }]);

        let events = coerce_loan_events(body);
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.event_id.value(), 7);
        assert_eq!(event.user_name.as_deref(), Some("Alice"));
        assert_eq!(event.status, Some(LoanStatus::Pending));
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.items[0].quantity.value(), 2);
        assert!(event.created_at.is_some());
        assert!(event.approved_at.is_none());
    }

    #[test]
    fn test_coerce_skips_malformed_entries_keeps_rest() {
        let body = json!([
            {"EventID": 1, "Status": "approved"},
            {"not_an_event": true},
            {"EventID": 2, "Status": "pending"}
        ]);

        let events = coerce_loan_events(body);
        let ids: Vec<_> = events.iter().map(|e| e.event_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unknown_status_becomes_none() {
        let body = json!([{"EventID": 1, "Status": "returned"}]);
        let events = coerce_loan_events(body);
        assert_eq!(events[0].status, None);
    }

    #[test]
    fn test_zero_quantity_lines_are_dropped() {
        let body = json!([{
            "EventID": 1,
            "Loan": [
                {"ItemID": 1, "Name": "Hammer", "Quantity": 0},
                {"ItemID": 2, "Name": "Saw", "Quantity": 1}
            ]
        }]);

        let events = coerce_loan_events(body);
        assert_eq!(events[0].items.len(), 1);
        assert_eq!(events[0].items[0].item_id.value(), 2);
    }

    // TDD: parse_timestamp() のテスト
    #[test]
    fn test_parse_timestamp_rfc3339() {
        let parsed = parse_timestamp("2025-05-01T09:30:00+07:00");
        assert!(parsed.is_some());
        assert_eq!(
            parsed.unwrap(),
            chrono::Utc.with_ymd_and_hms(2025, 5, 1, 2, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_timestamp_naive_fallback() {
        assert!(parse_timestamp("2025-05-01T09:30:00").is_some());
        assert!(parse_timestamp("2025-05-01 09:30:00").is_some());
    }

    #[test]
    fn test_parse_timestamp_garbage_is_none() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
    }

    use chrono::TimeZone;

    // TDD: coerce_items() のテスト
    #[test]
    fn test_coerce_items_accepts_both_id_spellings() {
        let body = json!([
            {"ItemID": 1, "Name": "Hammer", "MaxQuantity": 7, "CurrentQuantity": 6},
            {"ID": 2, "Name": "Saw", "MaxQuantity": 3, "CurrentQuantity": 3}
        ]);

        let items = coerce_items(body);
        let ids: Vec<_> = items.iter().map(|i| i.item_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_item_data_payload_uses_camel_case() {
        let draft = ItemDraft {
            name: "Hammer".to_string(),
            description: None,
            category: Some("hand-tools".to_string()),
            max_quantity: 7,
            current_quantity: 6,
            image_url: None,
        };

        let payload = serde_json::to_value(ItemDataPayload::from(&draft)).unwrap();
        assert_eq!(payload["maxQuantity"], 7);
        assert_eq!(payload["currentQuantity"], 6);
        assert_eq!(payload["name"], "Hammer");
    }
}
