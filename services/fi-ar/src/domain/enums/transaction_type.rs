//! 账务流水枚举

use serde::{Deserialize, Serialize};

/// 流水方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// 贷记（收款）
    Credit,
    /// 借记（付款/冲销）
    Debit,
}

impl TransactionType {
    /// 冲销方向
    pub fn reversed(&self) -> Self {
        match self {
            TransactionType::Credit => TransactionType::Debit,
            TransactionType::Debit => TransactionType::Credit,
        }
    }
}

impl From<i16> for TransactionType {
    fn from(value: i16) -> Self {
        match value {
            2 => TransactionType::Debit,
            _ => TransactionType::Credit,
        }
    }
}

impl From<TransactionType> for i16 {
    fn from(tipo: TransactionType) -> Self {
        match tipo {
            TransactionType::Credit => 1,
            TransactionType::Debit => 2,
        }
    }
}

/// 流水状态
///
/// 流水创建后不可修改；冲销通过建立反向流水完成，原流水标记为 Adjusted。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransactionStatus {
    #[default]
    Active,
    Adjusted,
}

impl From<i16> for TransactionStatus {
    fn from(value: i16) -> Self {
        match value {
            2 => TransactionStatus::Adjusted,
            _ => TransactionStatus::Active,
        }
    }
}

impl From<TransactionStatus> for i16 {
    fn from(status: TransactionStatus) -> Self {
        match status {
            TransactionStatus::Active => 1,
            TransactionStatus::Adjusted => 2,
        }
    }
}
