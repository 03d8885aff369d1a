use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::item::{Item, ItemDraft};
use crate::domain::user::User;
use crate::domain::value_objects::{EventId, ItemId, UserId};
use crate::domain::{LoanEvent, LoanStatus};
use crate::ports::backend_gateway::{
    BackendGateway as BackendGatewayTrait, ItemDetail, Result, UploadFile,
};

use super::wire::{
    ItemDataPayload, ItemDetailRecord, StatusPayload, UserRecord, coerce_items, coerce_loan_events,
};

/// BackendGatewayのHTTP実装
///
/// ベースURLは設定値。リトライ・バックオフ・冪等性ガードは持たず、
/// 失敗した書き込みは1回だけ報告される。
pub struct HttpBackendGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackendGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_value(&self, path: &str) -> Result<Value> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<Value>().await?)
    }

    /// `itemData`フィールドとオプションの`file`フィールドを持つmultipartフォームを組み立てる
    fn build_item_form(
        payload: &ItemDataPayload,
        image: Option<&UploadFile>,
    ) -> Result<reqwest::multipart::Form> {
        let mut form =
            reqwest::multipart::Form::new().text("itemData", serde_json::to_string(payload)?);

        if let Some(file) = image {
            form = form.part("file", Self::file_part(file)?);
        }

        Ok(form)
    }

    fn file_part(file: &UploadFile) -> Result<reqwest::multipart::Part> {
        let mut part =
            reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }
        Ok(part)
    }
}

#[async_trait]
impl BackendGatewayTrait for HttpBackendGateway {
    /// `GET /event` - 貸出イベント全件
    ///
    /// nullや配列以外のボディは0件に寛容変換する。
    async fn fetch_loan_events(&self) -> Result<Vec<LoanEvent>> {
        let body = self.get_value("/event").await?;
        Ok(coerce_loan_events(body))
    }

    /// `GET /admin/item` - 備品全件
    async fn fetch_items(&self) -> Result<Vec<Item>> {
        let body = self.get_value("/admin/item").await?;
        Ok(coerce_items(body))
    }

    /// `GET /admin/item/{id}` - 備品詳細（貸出履歴付き）
    async fn fetch_item(&self, item_id: ItemId) -> Result<Option<ItemDetail>> {
        let response = self
            .client
            .get(self.url(&format!("/admin/item/{}", item_id.value())))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record = response
            .error_for_status()?
            .json::<ItemDetailRecord>()
            .await?;

        Ok(Some(ItemDetail {
            item: record.item.into_domain(),
            borrow_history: record.events.into_iter().map(|e| e.into_domain()).collect(),
        }))
    }

    /// `GET /user/{id}` - 利用者（貸出履歴付き）
    async fn fetch_user(&self, user_id: UserId) -> Result<Option<User>> {
        let response = self
            .client
            .get(self.url(&format!("/user/{}", user_id.value())))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record = response.error_for_status()?.json::<UserRecord>().await?;
        Ok(Some(record.into_domain()))
    }

    /// `POST /item` - 備品作成（multipart）
    async fn create_item(&self, draft: &ItemDraft, image: Option<&UploadFile>) -> Result<()> {
        let form = Self::build_item_form(&ItemDataPayload::from(draft), image)?;

        self.client
            .post(self.url("/item"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// `PUT /admin/item/{id}` - 備品更新（multipart）
    async fn update_item(
        &self,
        item_id: ItemId,
        draft: &ItemDraft,
        image: Option<&UploadFile>,
    ) -> Result<()> {
        let form = Self::build_item_form(&ItemDataPayload::from(draft), image)?;

        self.client
            .put(self.url(&format!("/admin/item/{}", item_id.value())))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// `PUT /admin/item/img/{id}` - 備品画像の差し替え（multipart）
    async fn update_item_image(&self, item_id: ItemId, image: &UploadFile) -> Result<()> {
        let form = reqwest::multipart::Form::new().part("file", Self::file_part(image)?);

        self.client
            .put(self.url(&format!("/admin/item/img/{}", item_id.value())))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// `PUT /event/{id}/status` - 貸出ステータスの書き込み
    async fn update_event_status(&self, event_id: EventId, status: LoanStatus) -> Result<()> {
        self.client
            .put(self.url(&format!("/event/{}/status", event_id.value())))
            .json(&StatusPayload {
                status: status.as_str(),
            })
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
