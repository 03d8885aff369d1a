#![allow(dead_code)]

use chrono::NaiveDate;

use crate::domain::value_objects::EventId;
use crate::domain::{LoanEvent, StatusFilter};

// ============================================================================
// フィルタ条件
// ============================================================================

/// 貸出一覧の絞り込み条件
///
/// 検索・ステータス・日付はAND条件で合成される。
/// すべて未指定の場合はスナップショット全件を返す（恒等則）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanFilter {
    /// 借り手名の部分一致検索（大文字小文字を区別しない）
    pub search: String,
    /// ステータスの完全一致
    pub status: StatusFilter,
    /// 申請日のカレンダー日付一致（時刻は無視）
    pub date: Option<NaiveDate>,
}

impl LoanFilter {
    /// 絞り込みなしの条件
    pub fn none() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            date: None,
        }
    }
}

impl Default for LoanFilter {
    fn default() -> Self {
        Self::none()
    }
}

// ============================================================================
// 非致命的な通知
// ============================================================================

/// 利用者に提示する非致命的な通知
///
/// どの失敗もプロセスを停止させない。ビューは空または直前の状態に
/// 縮退し、通知が1件だけ記録される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// バックエンドがデータなし（空・null・配列以外）を返した
    NoLoanData,
    /// 取得が輸送層で失敗した（スナップショットは直前の状態を維持）
    FetchFailed(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoLoanData => {
                write!(f, "Could not retrieve loan history at this time")
            }
            Notice::FetchFailed(reason) => {
                write!(f, "There was a problem fetching the loan history: {}", reason)
            }
        }
    }
}

// ============================================================================
// LoanStore
// ============================================================================

/// 貸出スナップショットのクライアント側ストア
///
/// セッション中の貸出コレクションの唯一の所有者。フィルタリングと
/// ページネーションはこのスナップショットに対する純粋な導出として行う。
///
/// 取得リクエストには世代トークンを発行し、最新の世代のみが
/// スナップショットにコミットできる。古いリクエストの結果が後から
/// 届いても破棄される（リクエスト競合ガード）。
#[derive(Debug)]
pub struct LoanStore {
    snapshot: Vec<LoanEvent>,
    /// 最後に発行した取得世代
    generation: u64,
    notices: Vec<Notice>,
}

impl LoanStore {
    pub fn new() -> Self {
        Self {
            snapshot: Vec::new(),
            generation: 0,
            notices: Vec::new(),
        }
    }

    /// 現在のスナップショット全件
    pub fn snapshot(&self) -> &[LoanEvent] {
        &self.snapshot
    }

    /// 取得を開始し、世代トークンを発行する
    ///
    /// 以後、このトークンより新しい世代が発行されたら、このトークンでの
    /// コミットは拒否される。
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// 取得結果をスナップショットにコミットする
    ///
    /// トークンが最新世代の場合のみ反映する。空の結果は「データなし」
    /// として扱い、エラーではなく通知を1件記録する。
    ///
    /// # 戻り値
    /// コミットされた場合はtrue、古い世代として破棄された場合はfalse
    pub fn commit(&mut self, token: u64, events: Vec<LoanEvent>) -> bool {
        if token != self.generation {
            return false;
        }

        if events.is_empty() {
            self.notices.push(Notice::NoLoanData);
        }
        self.snapshot = events;
        true
    }

    /// 取得の輸送層失敗を記録する
    ///
    /// スナップショットは直前の状態のまま残す。古い世代の失敗は無視する。
    pub fn record_fetch_failure(&mut self, token: u64, reason: String) {
        if token != self.generation {
            return;
        }
        self.notices.push(Notice::FetchFailed(reason));
    }

    /// 溜まった通知を取り出す（取り出し後はクリアされる）
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// IDで1件取得
    pub fn get(&self, event_id: EventId) -> Option<&LoanEvent> {
        self.snapshot.iter().find(|l| l.event_id == event_id)
    }

    /// スナップショット内のエントリを`event_id`で置き換える
    ///
    /// ステータス遷移を確定・巻き戻しする唯一の変更経路。
    ///
    /// # 戻り値
    /// 置き換え前のエントリ。該当IDがなければ`None`（何も変更しない）。
    pub fn replace(&mut self, updated: LoanEvent) -> Option<LoanEvent> {
        let slot = self
            .snapshot
            .iter_mut()
            .find(|l| l.event_id == updated.event_id)?;
        Some(std::mem::replace(slot, updated))
    }

    /// 純粋関数：スナップショットに絞り込み条件を適用する
    ///
    /// - 検索：`user_name`の大文字小文字を区別しない部分一致。
    ///   名前を持たないレコードは空でない検索には決して合致しない。
    /// - ステータス：完全一致。ステータス不明のレコードはスキップ。
    /// - 日付：`created_at`のカレンダー日付一致（時刻は無視）。
    ///   日付が取得できないレコードは合致しない。
    ///
    /// 条件はANDで合成される。条件をすべて解除すると全件が返る。
    pub fn apply_filters(&self, filter: &LoanFilter) -> Vec<LoanEvent> {
        let mut result: Vec<LoanEvent> = self.snapshot.clone();

        let search = filter.search.trim().to_lowercase();
        if !search.is_empty() {
            result.retain(|loan| match &loan.user_name {
                Some(name) => name.to_lowercase().contains(&search),
                None => false,
            });
        }

        if filter.status != StatusFilter::All {
            result.retain(|loan| filter.status.matches(loan.status));
        }

        if let Some(filter_date) = filter.date {
            result.retain(|loan| match loan.created_at {
                Some(created_at) => created_at.date_naive() == filter_date,
                None => false,
            });
        }

        result
    }
}

impl Default for LoanStore {
    fn default() -> Self {
        Self::new()
    }
}

/// 純粋関数：1始まりのページを切り出す
///
/// 範囲外のページ（`page < 1`、または開始位置が件数以上）は
/// エラーではなく空ページを返す。
pub fn paginate<T: Clone>(list: &[T], page: i64, page_size: usize) -> Vec<T> {
    if page < 1 || page_size == 0 {
        return Vec::new();
    }

    let start = (page as usize - 1).saturating_mul(page_size);
    if start >= list.len() {
        return Vec::new();
    }

    let end = usize::min(start + page_size, list.len());
    list[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{EventId, ItemId, Quantity, UserId};
    use crate::domain::{LoanLine, LoanStatus};
    use chrono::{DateTime, TimeZone, Utc};

    fn loan(
        id: i64,
        user_name: Option<&str>,
        status: Option<LoanStatus>,
        created_at: Option<DateTime<Utc>>,
    ) -> LoanEvent {
        LoanEvent {
            event_id: EventId::new(id),
            user_id: UserId::new(id * 10),
            user_name: user_name.map(|s| s.to_string()),
            created_at,
            approved_at: None,
            status,
            items: vec![LoanLine {
                item_id: ItemId::new(1),
                name: "Multimeter".to_string(),
                quantity: Quantity::try_from(1).unwrap(),
                image_url: None,
            }],
        }
    }

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    fn store_with(loans: Vec<LoanEvent>) -> LoanStore {
        let mut store = LoanStore::new();
        let token = store.begin_load();
        store.commit(token, loans);
        store
    }

    // TDD: apply_filters() のテスト
    #[test]
    fn test_apply_filters_identity_when_cleared() {
        let loans = vec![
            loan(1, Some("Alice"), Some(LoanStatus::Pending), Some(day(2025, 5, 1))),
            loan(2, None, None, None),
            loan(3, Some("Bob"), Some(LoanStatus::Completed), Some(day(2025, 5, 2))),
        ];
        let store = store_with(loans.clone());

        // 条件をすべて解除すると全件がそのまま返る（恒等則）
        assert_eq!(store.apply_filters(&LoanFilter::none()), loans);
    }

    #[test]
    fn test_apply_filters_search_is_case_insensitive_substring() {
        let store = store_with(vec![
            loan(1, Some("Alice"), Some(LoanStatus::Pending), None),
            loan(2, Some("Malia"), Some(LoanStatus::Pending), None),
            loan(3, Some("Bob"), Some(LoanStatus::Pending), None),
        ]);

        let filter = LoanFilter {
            search: "ali".to_string(),
            ..LoanFilter::none()
        };
        let result = store.apply_filters(&filter);

        let names: Vec<_> = result.iter().map(|l| l.user_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["Alice", "Malia"]);
    }

    #[test]
    fn test_apply_filters_search_never_matches_missing_user_name() {
        let store = store_with(vec![
            loan(1, Some("Alice"), Some(LoanStatus::Pending), None),
            loan(2, None, Some(LoanStatus::Pending), None),
        ]);

        let filter = LoanFilter {
            search: "ali".to_string(),
            ..LoanFilter::none()
        };
        let result = store.apply_filters(&filter);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].event_id, EventId::new(1));
    }

    #[test]
    fn test_apply_filters_whitespace_search_is_ignored() {
        let loans = vec![
            loan(1, Some("Alice"), None, None),
            loan(2, None, None, None),
        ];
        let store = store_with(loans.clone());

        let filter = LoanFilter {
            search: "   ".to_string(),
            ..LoanFilter::none()
        };
        assert_eq!(store.apply_filters(&filter), loans);
    }

    #[test]
    fn test_apply_filters_status_skips_records_without_status() {
        let store = store_with(vec![
            loan(1, Some("Alice"), Some(LoanStatus::Approved), None),
            loan(2, Some("Bob"), None, None),
            loan(3, Some("Carol"), Some(LoanStatus::Pending), None),
        ]);

        let filter = LoanFilter {
            status: StatusFilter::Only(LoanStatus::Approved),
            ..LoanFilter::none()
        };
        let result = store.apply_filters(&filter);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].event_id, EventId::new(1));
    }

    #[test]
    fn test_apply_filters_date_compares_calendar_day_only() {
        let store = store_with(vec![
            // 同じ日の異なる時刻
            loan(1, Some("Alice"), None, Some(Utc.with_ymd_and_hms(2025, 5, 1, 0, 5, 0).unwrap())),
            loan(2, Some("Bob"), None, Some(Utc.with_ymd_and_hms(2025, 5, 1, 23, 55, 0).unwrap())),
            loan(3, Some("Carol"), None, Some(day(2025, 5, 2))),
            // 日付が取得できないレコード
            loan(4, Some("Dave"), None, None),
        ]);

        let filter = LoanFilter {
            date: Some(chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
            ..LoanFilter::none()
        };
        let result = store.apply_filters(&filter);

        let ids: Vec<_> = result.iter().map(|l| l.event_id.value()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_apply_filters_composes_with_and_semantics() {
        let store = store_with(vec![
            loan(1, Some("Alice"), Some(LoanStatus::Pending), Some(day(2025, 5, 1))),
            loan(2, Some("Alice"), Some(LoanStatus::Approved), Some(day(2025, 5, 1))),
            loan(3, Some("Alice"), Some(LoanStatus::Pending), Some(day(2025, 5, 2))),
            loan(4, Some("Bob"), Some(LoanStatus::Pending), Some(day(2025, 5, 1))),
        ]);

        let filter = LoanFilter {
            search: "alice".to_string(),
            status: StatusFilter::Only(LoanStatus::Pending),
            date: Some(chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
        };
        let combined = store.apply_filters(&filter);

        // 各条件を単独で適用した結果の積集合に含まれること
        let by_search = store.apply_filters(&LoanFilter {
            search: "alice".to_string(),
            ..LoanFilter::none()
        });
        let by_status = store.apply_filters(&LoanFilter {
            status: StatusFilter::Only(LoanStatus::Pending),
            ..LoanFilter::none()
        });
        let by_date = store.apply_filters(&LoanFilter {
            date: Some(chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap()),
            ..LoanFilter::none()
        });

        for l in &combined {
            assert!(by_search.contains(l));
            assert!(by_status.contains(l));
            assert!(by_date.contains(l));
        }
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].event_id, EventId::new(1));
    }

    // TDD: paginate() のテスト
    #[test]
    fn test_paginate_returns_third_page_slice() {
        let loans: Vec<LoanEvent> = (1..=25)
            .map(|i| loan(i, Some("User"), None, None))
            .collect();

        let page = paginate(&loans, 3, 10);

        // 25件の3ページ目（10件/ページ）は21〜25件目の5件
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].event_id.value(), 21);
        assert_eq!(page[4].event_id.value(), 25);
    }

    #[test]
    fn test_paginate_length_never_exceeds_page_size() {
        let loans: Vec<LoanEvent> = (1..=25)
            .map(|i| loan(i, Some("User"), None, None))
            .collect();

        for page in 1..=5 {
            assert!(paginate(&loans, page, 10).len() <= 10);
        }
    }

    #[test]
    fn test_paginate_out_of_range_yields_empty_page() {
        let loans: Vec<LoanEvent> = (1..=5).map(|i| loan(i, None, None, None)).collect();

        assert!(paginate(&loans, 0, 10).is_empty());
        assert!(paginate(&loans, -1, 10).is_empty());
        assert!(paginate(&loans, 2, 10).is_empty());
        assert!(paginate(&loans, 100, 10).is_empty());
    }

    #[test]
    fn test_paginate_empty_list() {
        let loans: Vec<LoanEvent> = Vec::new();
        assert!(paginate(&loans, 1, 10).is_empty());
    }

    // TDD: 世代ガードのテスト
    #[test]
    fn test_commit_rejects_superseded_generation() {
        let mut store = LoanStore::new();

        let old_token = store.begin_load();
        let new_token = store.begin_load();

        // 古い世代の結果は破棄される
        let stale = vec![loan(1, Some("Stale"), None, None)];
        assert!(!store.commit(old_token, stale));
        assert!(store.snapshot().is_empty());

        // 最新世代の結果はコミットされる
        let fresh = vec![loan(2, Some("Fresh"), None, None)];
        assert!(store.commit(new_token, fresh));
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(store.snapshot()[0].event_id, EventId::new(2));
    }

    #[test]
    fn test_commit_empty_result_records_single_notice() {
        let mut store = LoanStore::new();
        let token = store.begin_load();

        assert!(store.commit(token, Vec::new()));
        assert!(store.snapshot().is_empty());

        let notices = store.drain_notices();
        assert_eq!(notices, vec![Notice::NoLoanData]);

        // 取り出し後はクリアされる
        assert!(store.drain_notices().is_empty());
    }

    #[test]
    fn test_fetch_failure_keeps_previous_snapshot() {
        let mut store = store_with(vec![loan(1, Some("Alice"), None, None)]);

        let token = store.begin_load();
        store.record_fetch_failure(token, "connection refused".to_string());

        // 直前のスナップショットは維持される
        assert_eq!(store.snapshot().len(), 1);
        assert_eq!(
            store.drain_notices(),
            vec![Notice::FetchFailed("connection refused".to_string())]
        );
    }

    #[test]
    fn test_stale_fetch_failure_is_ignored() {
        let mut store = LoanStore::new();

        let old_token = store.begin_load();
        let new_token = store.begin_load();
        store.record_fetch_failure(old_token, "timeout".to_string());
        assert!(store.drain_notices().is_empty());

        store.record_fetch_failure(new_token, "timeout".to_string());
        assert_eq!(store.drain_notices().len(), 1);
    }

    // TDD: replace() のテスト
    #[test]
    fn test_replace_swaps_entry_by_event_id() {
        let mut store = store_with(vec![
            loan(1, Some("Alice"), Some(LoanStatus::Pending), None),
            loan(2, Some("Bob"), Some(LoanStatus::Pending), None),
        ]);

        let mut updated = store.get(EventId::new(1)).unwrap().clone();
        updated.status = Some(LoanStatus::Approved);

        let previous = store.replace(updated.clone());
        assert_eq!(previous.unwrap().status, Some(LoanStatus::Pending));
        assert_eq!(
            store.get(EventId::new(1)).unwrap().status,
            Some(LoanStatus::Approved)
        );
        // 他のエントリは変化しない
        assert_eq!(
            store.get(EventId::new(2)).unwrap().status,
            Some(LoanStatus::Pending)
        );
    }

    #[test]
    fn test_replace_unknown_id_is_noop() {
        let mut store = store_with(vec![loan(1, Some("Alice"), None, None)]);

        let ghost = loan(99, Some("Ghost"), None, None);
        assert!(store.replace(ghost).is_none());
        assert_eq!(store.snapshot().len(), 1);
    }
}
