//! 行情查询端口的 PostgreSQL 实现
//!
//! 只读查询，直接走连接池，不参与结算事务。

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_domain_core::MetalType;
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::domain::repositories::QuotationLookup;
use crate::domain::value_objects::QuoteSnapshot;

#[derive(Debug, FromRow)]
struct QuotationRow {
    metal: i16,
    date: DateTime<Utc>,
    buy_price: Decimal,
    sell_price: Decimal,
}

impl QuotationRow {
    fn into_snapshot(self) -> QuoteSnapshot {
        QuoteSnapshot {
            metal: MetalType::from_i16(self.metal).unwrap_or(MetalType::Gold),
            date: self.date,
            buy_price: self.buy_price,
            sell_price: self.sell_price,
        }
    }
}

/// PostgreSQL 行情查询
pub struct PgQuotationLookup {
    pool: PgPool,
}

impl PgQuotationLookup {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotationLookup for PgQuotationLookup {
    async fn find_latest(
        &self,
        metal: MetalType,
        tenant_id: &TenantId,
        as_of: DateTime<Utc>,
    ) -> AppResult<Option<QuoteSnapshot>> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT metal, date, buy_price, sell_price
            FROM quotations
            WHERE tenant_id = $1 AND metal = $2 AND date <= $3
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id.0)
        .bind(metal.as_i16())
        .bind(as_of)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("查询最新行情失败: {}", e)))?;

        Ok(row.map(QuotationRow::into_snapshot))
    }

    async fn find_by_date(
        &self,
        date: DateTime<Utc>,
        metal: MetalType,
        tenant_id: &TenantId,
    ) -> AppResult<Option<QuoteSnapshot>> {
        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT metal, date, buy_price, sell_price
            FROM quotations
            WHERE tenant_id = $1 AND metal = $2 AND date::date = $3::date
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .bind(tenant_id.0)
        .bind(metal.as_i16())
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("查询当日行情失败: {}", e)))?;

        Ok(row.map(QuotationRow::into_snapshot))
    }
}
