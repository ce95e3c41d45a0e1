//! 产品实体（结算核算所需的最小视图）

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams};
use serde::{Deserialize, Serialize};

use crate::domain::enums::SaleAdjustmentCalcMethod;
use crate::domain::value_objects::ProductId;

/// 产品
///
/// 结算核心只关心单件含金量与产品组的核算方法，
/// 完整的产品主数据由 mdm 上下文维护。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    tenant_id: TenantId,
    name: String,
    /// 单件含金量（g/件）
    gold_value_per_unit: Grams,
    /// 产品组的期望产出核算方法
    calc_method: SaleAdjustmentCalcMethod,
    audit_info: AuditInfo,
}

impl Product {
    pub fn new(
        tenant_id: TenantId,
        name: impl Into<String>,
        gold_value_per_unit: Grams,
        calc_method: SaleAdjustmentCalcMethod,
    ) -> Self {
        Self {
            id: ProductId::new(),
            tenant_id,
            name: name.into(),
            gold_value_per_unit,
            calc_method,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn restore(
        id: ProductId,
        tenant_id: TenantId,
        name: String,
        gold_value_per_unit: Grams,
        calc_method: SaleAdjustmentCalcMethod,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            name,
            gold_value_per_unit,
            calc_method,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gold_value_per_unit(&self) -> Grams {
        self.gold_value_per_unit
    }

    pub fn calc_method(&self) -> SaleAdjustmentCalcMethod {
        self.calc_method
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Product {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
