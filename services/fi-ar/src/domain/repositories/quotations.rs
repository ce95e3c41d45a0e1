//! 行情查询端口

use async_trait::async_trait;
use aurum_common::TenantId;
use aurum_domain_core::MetalType;
use aurum_errors::AppResult;
use chrono::{DateTime, Utc};

use crate::domain::value_objects::QuoteSnapshot;

/// 行情查询端口（外部协作方，由行情上下文提供）
#[async_trait]
pub trait QuotationLookup: Send + Sync {
    /// 查找指定日期（含）之前最近的一条报价
    async fn find_latest(
        &self,
        metal: MetalType,
        tenant_id: &TenantId,
        as_of: DateTime<Utc>,
    ) -> AppResult<Option<QuoteSnapshot>>;

    /// 查找指定自然日的报价
    async fn find_by_date(
        &self,
        date: DateTime<Utc>,
        metal: MetalType,
        tenant_id: &TenantId,
    ) -> AppResult<Option<QuoteSnapshot>>;
}
