//! 强类型 ID 定义

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// 定义一个基于 UUID v7 的强类型 ID
macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From,
        )]
        #[display("{_0}")]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

define_id!(
    /// 销售单 ID
    SaleId
);
define_id!(
    /// 销售行项目 ID
    SaleItemId
);
define_id!(
    /// 产品 ID
    ProductId
);
define_id!(
    /// 客户/往来方 ID
    PersonId
);
define_id!(
    /// 应收账款 ID
    AccountRecId
);
define_id!(
    /// 销售分期 ID
    SaleInstallmentId
);
define_id!(
    /// 账务流水 ID
    TransactionId
);
define_id!(
    /// 金属信用 ID
    MetalCreditId
);
define_id!(
    /// 金属台账 ID
    MetalAccountId
);
define_id!(
    /// 金属台账分录 ID
    MetalAccountEntryId
);
define_id!(
    /// 纯金属批次 ID
    PureMetalLotId
);
define_id!(
    /// 销售调整记录 ID
    SaleAdjustmentId
);
define_id!(
    /// 会计科目 ID
    LedgerAccountId
);
define_id!(
    /// 资金账户 ID
    CurrentAccountId
);
define_id!(
    /// 工费表条目 ID
    LaborCostEntryId
);
