//! 记账科目配置端口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::{AppError, AppResult};

use crate::domain::value_objects::LedgerAccountId;

/// 结算相关的默认记账科目
///
/// 科目缺失属于配置错误，结算前置校验统一拒绝。
#[derive(Debug, Clone, Default)]
pub struct SettlementAccounts {
    /// 默认收入科目
    pub revenue_account_id: Option<LedgerAccountId>,
    /// 金属库存科目
    pub metal_stock_account_id: Option<LedgerAccountId>,
    /// 金属信用应付科目
    pub metal_credit_payable_account_id: Option<LedgerAccountId>,
}

impl SettlementAccounts {
    pub fn require_revenue(&self) -> AppResult<LedgerAccountId> {
        self.revenue_account_id.ok_or_else(|| {
            AppError::configuration("未配置默认收入科目，无法登记收款".to_string())
        })
    }

    pub fn require_metal_stock(&self) -> AppResult<LedgerAccountId> {
        self.metal_stock_account_id.ok_or_else(|| {
            AppError::configuration("未配置金属库存科目，无法登记金属收款".to_string())
        })
    }

    pub fn require_metal_credit_payable(&self) -> AppResult<LedgerAccountId> {
        self.metal_credit_payable_account_id.ok_or_else(|| {
            AppError::configuration("未配置金属信用应付科目，无法登记信用转移".to_string())
        })
    }
}

/// 配置查询端口（外部协作方，由设置上下文提供）
#[async_trait]
pub trait SettingsLookup: Send + Sync {
    /// 查询租户的结算记账科目
    async fn settlement_accounts(&self, tenant_id: &TenantId) -> AppResult<SettlementAccounts>;
}
