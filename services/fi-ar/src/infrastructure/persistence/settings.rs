//! 记账科目配置端口的 PostgreSQL 实现

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_errors::{AppError, AppResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::domain::repositories::{SettingsLookup, SettlementAccounts};
use crate::domain::value_objects::LedgerAccountId;

#[derive(Debug, FromRow)]
struct TenantSettingsRow {
    default_revenue_account_id: Option<Uuid>,
    metal_stock_account_id: Option<Uuid>,
    metal_credit_payable_account_id: Option<Uuid>,
}

/// PostgreSQL 配置查询
pub struct PgSettingsLookup {
    pool: PgPool,
}

impl PgSettingsLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsLookup for PgSettingsLookup {
    async fn settlement_accounts(&self, tenant_id: &TenantId) -> AppResult<SettlementAccounts> {
        let row = sqlx::query_as::<_, TenantSettingsRow>(
            r#"
            SELECT default_revenue_account_id, metal_stock_account_id,
                   metal_credit_payable_account_id
            FROM tenant_settings
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("查询租户配置失败: {}", e)))?;

        // 未建配置记录等同于全部科目缺失，由 require_* 给出配置错误
        let row = row.unwrap_or(TenantSettingsRow {
            default_revenue_account_id: None,
            metal_stock_account_id: None,
            metal_credit_payable_account_id: None,
        });

        Ok(SettlementAccounts {
            revenue_account_id: row.default_revenue_account_id.map(LedgerAccountId::from_uuid),
            metal_stock_account_id: row.metal_stock_account_id.map(LedgerAccountId::from_uuid),
            metal_credit_payable_account_id: row
                .metal_credit_payable_account_id
                .map(LedgerAccountId::from_uuid),
        })
    }
}
