use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::item::{Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::value_objects::{EventId, ItemId, UserId};
use crate::domain::{LoanEvent, LoanStatus};
use crate::ports::backend_gateway::{
    BackendGateway as BackendGatewayTrait, ItemDetail, Result, UploadFile,
};

/// BackendGatewayのモック実装
///
/// バックエンドなしでの起動とテストをサポートする。
/// 貸出・備品・利用者をインメモリに保持し、輸送層の失敗を
/// フラグでシミュレートできる。
pub struct MockBackendGateway {
    events: Mutex<Vec<LoanEvent>>,
    items: Mutex<HashMap<ItemId, Item>>,
    users: Mutex<HashMap<UserId, User>>,
    status_writes: Mutex<Vec<(EventId, LoanStatus)>>,
    fail_fetch: AtomicBool,
    fail_status_write: AtomicBool,
}

#[allow(dead_code)]
impl MockBackendGateway {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            items: Mutex::new(HashMap::new()),
            users: Mutex::new(HashMap::new()),
            status_writes: Mutex::new(Vec::new()),
            fail_fetch: AtomicBool::new(false),
            fail_status_write: AtomicBool::new(false),
        }
    }

    /// テスト用に貸出イベントを登録
    pub fn add_event(&self, event: LoanEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// テスト用に備品を登録
    pub fn add_item(&self, item: Item) {
        self.items.lock().unwrap().insert(item.item_id, item);
    }

    /// テスト用に利用者を登録
    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().insert(user.user_id, user);
    }

    /// 以後の取得を輸送層エラーにする
    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    /// 以後のステータス書き込みを輸送層エラーにする
    pub fn set_fail_status_write(&self, fail: bool) {
        self.fail_status_write.store(fail, Ordering::SeqCst);
    }

    /// 受け付けたステータス書き込みの履歴
    pub fn status_writes(&self) -> Vec<(EventId, LoanStatus)> {
        self.status_writes.lock().unwrap().clone()
    }
}

impl Default for MockBackendGateway {
    fn default() -> Self {
        Self::new()
    }
}

fn transport_error() -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "simulated transport failure",
    ))
}

#[async_trait]
impl BackendGatewayTrait for MockBackendGateway {
    async fn fetch_loan_events(&self) -> Result<Vec<LoanEvent>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        Ok(self.events.lock().unwrap().clone())
    }

    async fn fetch_items(&self) -> Result<Vec<Item>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        let mut items: Vec<Item> = self.items.lock().unwrap().values().cloned().collect();
        items.sort_by_key(|i| i.item_id.value());
        Ok(items)
    }

    async fn fetch_item(&self, item_id: ItemId) -> Result<Option<ItemDetail>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        let item = self.items.lock().unwrap().get(&item_id).cloned();
        Ok(item.map(|item| {
            // 対象備品を含む貸出イベントを履歴として返す
            let borrow_history = self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.items.iter().any(|line| line.item_id == item_id))
                .cloned()
                .collect();
            ItemDetail {
                item,
                borrow_history,
            }
        }))
    }

    async fn fetch_user(&self, user_id: UserId) -> Result<Option<User>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }

    async fn create_item(&self, draft: &ItemDraft, _image: Option<&UploadFile>) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        let next_id = ItemId::new(items.len() as i64 + 1);
        items.insert(
            next_id,
            Item {
                item_id: next_id,
                name: draft.name.clone(),
                description: draft.description.clone(),
                category: draft.category.clone(),
                image_url: draft.image_url.clone(),
                bookmarks: false,
                max_quantity: draft.max_quantity,
                current_quantity: draft.current_quantity,
            },
        );
        Ok(())
    }

    async fn update_item(
        &self,
        item_id: ItemId,
        draft: &ItemDraft,
        _image: Option<&UploadFile>,
    ) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.get_mut(&item_id) {
            item.name = draft.name.clone();
            item.description = draft.description.clone();
            item.category = draft.category.clone();
            item.image_url = draft.image_url.clone();
        }
        Ok(())
    }

    async fn update_item_image(&self, item_id: ItemId, image: &UploadFile) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        if let Some(item) = items.get_mut(&item_id) {
            item.image_url = Some(image.file_name.clone());
        }
        Ok(())
    }

    async fn update_event_status(&self, event_id: EventId, status: LoanStatus) -> Result<()> {
        if self.fail_status_write.load(Ordering::SeqCst) {
            return Err(transport_error());
        }
        self.status_writes.lock().unwrap().push((event_id, status));
        Ok(())
    }
}
