#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// 貸出イベントID - バックエンドが採番する貸出リクエストの集約ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(i64);

impl EventId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 利用者ID - 利用者管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 備品ID - 在庫管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(i64);

impl ItemId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 数量エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// 数量は1以上でなければならない
    MustBeAtLeastOne,
}

/// 貸出明細の数量
///
/// 不変条件：数量は1以上
/// 型システムでこの制約を強制し、数量0の明細行を作成できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    /// 現在の数量
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value < 1 {
            return Err(QuantityError::MustBeAtLeastOne);
        }
        Ok(Self(value))
    }
}
