use crate::domain::item::{Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::value_objects::{EventId, ItemId, UserId};
use crate::domain::{LoanEvent, LoanStatus};
use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Item detail returned by the backend, with the borrow history embedded.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct ItemDetail {
    pub item: Item,
    pub borrow_history: Vec<LoanEvent>,
}

/// An uploaded image file forwarded to the backend as a multipart part.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Backend Gateway port for the remote inventory/user/loan service.
///
/// The remote service owns all persistent state; this core only depends on
/// its request/response shapes. No retry, backoff, or idempotency logic is
/// implemented on this side: a failed write is reported once.
#[allow(dead_code)]
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Fetch the full loan event collection.
    ///
    /// A `null` or non-array response body is coerced to an empty
    /// collection by the adapter, never surfaced as an error.
    async fn fetch_loan_events(&self) -> Result<Vec<LoanEvent>>;

    /// Fetch the full inventory item collection.
    async fn fetch_items(&self) -> Result<Vec<Item>>;

    /// Fetch a single item with its borrow history.
    ///
    /// Returns `None` when the backend does not know the item.
    async fn fetch_item(&self, item_id: ItemId) -> Result<Option<ItemDetail>>;

    /// Fetch a single user with the loan history embedded.
    async fn fetch_user(&self, user_id: UserId) -> Result<Option<User>>;

    /// Create an item (multipart: JSON payload plus optional image file).
    async fn create_item(&self, draft: &ItemDraft, image: Option<&UploadFile>) -> Result<()>;

    /// Update an item (multipart, same shape as create).
    async fn update_item(
        &self,
        item_id: ItemId,
        draft: &ItemDraft,
        image: Option<&UploadFile>,
    ) -> Result<()>;

    /// Replace an item image only.
    async fn update_item_image(&self, item_id: ItemId, image: &UploadFile) -> Result<()>;

    /// Persist a loan status change.
    ///
    /// Called after the transition has been validated locally.
    async fn update_event_status(&self, event_id: EventId, status: LoanStatus) -> Result<()>;
}
