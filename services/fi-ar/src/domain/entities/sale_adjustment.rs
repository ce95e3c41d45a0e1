//! 销售调整记录

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, Money};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{SaleAdjustmentId, SaleId};

/// 调整引擎的计算结果
///
/// 业务规则（保持原样，勿重新推导）：工费已包含在成本/期望克重口径中，
/// 因此净利润与净差异均不再二次扣减工费。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentFigures {
    /// 实际收款（BRL）
    pub payment_received_brl: Money,
    /// 实际收款报价（BRL/g）
    pub payment_quotation: Decimal,
    /// 收款折算克重
    pub payment_equivalent_grams: Grams,
    /// 期望产出克重
    pub sale_expected_grams: Grams,
    /// 毛差异（收款克重 − 期望克重）
    pub gross_discrepancy_grams: Grams,
    /// 其他成本（运费，BRL）
    pub costs_brl: Money,
    /// 其他成本折算克重
    pub costs_in_grams: Grams,
    /// 净差异（毛差异 − 其他成本克重）
    pub net_discrepancy_grams: Grams,
    /// 工费（克重）
    pub labor_cost_in_grams: Grams,
    /// 工费（BRL）
    pub labor_cost_brl: Money,
    /// 成本合计（BRL）
    pub total_cost_brl: Money,
    /// 毛利润（收款 − 成本合计）
    pub gross_profit_brl: Money,
    /// 佣金（BRL）
    pub commission_brl: Money,
    /// 净利润（毛利润 − 运费 − 佣金）
    pub net_profit_brl: Money,
}

/// 销售调整记录
///
/// 每张销售单至多一条，每次调整运行整体重建覆盖，从不增量修补。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleAdjustment {
    id: SaleAdjustmentId,
    tenant_id: TenantId,
    sale_id: SaleId,
    figures: AdjustmentFigures,
    calculated_at: DateTime<Utc>,
    audit_info: AuditInfo,
}

impl SaleAdjustment {
    pub fn build(
        tenant_id: TenantId,
        sale_id: SaleId,
        figures: AdjustmentFigures,
        calculated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SaleAdjustmentId::new(),
            tenant_id,
            sale_id,
            figures,
            calculated_at,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn restore(
        id: SaleAdjustmentId,
        tenant_id: TenantId,
        sale_id: SaleId,
        figures: AdjustmentFigures,
        calculated_at: DateTime<Utc>,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            sale_id,
            figures,
            calculated_at,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn sale_id(&self) -> &SaleId {
        &self.sale_id
    }

    pub fn figures(&self) -> &AdjustmentFigures {
        &self.figures
    }

    pub fn calculated_at(&self) -> DateTime<Utc> {
        self.calculated_at
    }
}

impl Entity for SaleAdjustment {
    type Id = SaleAdjustmentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for SaleAdjustment {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
