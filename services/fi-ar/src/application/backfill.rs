//! 调整回填
//!
//! 对租户下全部已完结销售单重跑调整重算。幂等，可重复执行。

use std::sync::Arc;

use aurum_common::TenantId;
use aurum_errors::AppResult;
use serde::Serialize;
use tracing::{error, info};

use crate::application::adjustment::{AdjustmentEngine, AdjustmentOutcome};
use crate::domain::unit_of_work::UnitOfWorkFactory;

/// 回填结果汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    /// 已重算写入
    pub recalculated: u32,
    /// 跳过（无结算流水等）
    pub skipped: u32,
    /// 失败（逐单隔离，不中断整体）
    pub failed: u32,
}

/// 调整回填处理器
pub struct BackfillHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
}

impl BackfillHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>) -> Self {
        Self { uow_factory }
    }

    /// 重算租户下全部已完结销售单的调整记录
    ///
    /// 每张销售单在自己的事务内重算，单张失败不影响其余。
    pub async fn recalculate_finalized_sales(
        &self,
        tenant_id: &TenantId,
    ) -> AppResult<BackfillSummary> {
        let sale_ids = {
            let uow = self.uow_factory.begin().await?;
            let ids = uow.sales().list_finalized_ids(tenant_id).await?;
            uow.rollback().await?;
            ids
        };

        info!(total = sale_ids.len(), "Starting adjustment backfill");

        let mut summary = BackfillSummary::default();
        for sale_id in &sale_ids {
            match AdjustmentEngine::recalculate_standalone(
                self.uow_factory.as_ref(),
                sale_id,
                tenant_id,
            )
            .await
            {
                Ok(AdjustmentOutcome::Written) => summary.recalculated += 1,
                Ok(_) => summary.skipped += 1,
                Err(e) => {
                    error!(sale_id = %sale_id, error = %e, "Adjustment backfill failed for sale");
                    summary.failed += 1;
                }
            }
        }

        info!(
            recalculated = summary.recalculated,
            skipped = summary.skipped,
            failed = summary.failed,
            "Adjustment backfill finished"
        );
        Ok(summary)
    }
}
