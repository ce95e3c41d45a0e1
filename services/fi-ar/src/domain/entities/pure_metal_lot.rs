//! 纯金属库存批次实体

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, MetalType};
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::enums::PureMetalLotStatus;
use crate::domain::value_objects::{PureMetalLotId, SaleId};

/// 批次来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PureMetalLotSource {
    /// 客户以实物金属支付销售款
    SalePayment,
    /// 销售数据修正
    SaleCorrection,
}

impl From<i16> for PureMetalLotSource {
    fn from(value: i16) -> Self {
        match value {
            2 => PureMetalLotSource::SaleCorrection,
            _ => PureMetalLotSource::SalePayment,
        }
    }
}

impl From<PureMetalLotSource> for i16 {
    fn from(source: PureMetalLotSource) -> Self {
        match source {
            PureMetalLotSource::SalePayment => 1,
            PureMetalLotSource::SaleCorrection => 2,
        }
    }
}

/// 纯金属批次
///
/// 实物金属入库单位，纯度以 (0, 1] 小数记录。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PureMetalLot {
    id: PureMetalLotId,
    tenant_id: TenantId,
    source: PureMetalLotSource,
    source_id: Option<Uuid>,
    sale_id: Option<SaleId>,
    description: String,
    metal_type: MetalType,
    initial_grams: Grams,
    remaining_grams: Grams,
    purity: Decimal,
    status: PureMetalLotStatus,
    entry_date: DateTime<Utc>,
    audit_info: AuditInfo,
}

impl PureMetalLot {
    #[allow(clippy::too_many_arguments)]
    pub fn receive(
        tenant_id: TenantId,
        source: PureMetalLotSource,
        source_id: Option<Uuid>,
        sale_id: Option<SaleId>,
        description: impl Into<String>,
        metal_type: MetalType,
        grams: Grams,
        purity: Decimal,
        entry_date: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !grams.is_positive() {
            return Err(AppError::validation("入库克重必须为正数".to_string()));
        }
        if purity <= Decimal::ZERO || purity > Decimal::ONE {
            return Err(AppError::validation(format!(
                "纯度必须在 (0, 1] 区间内，收到 {}",
                purity
            )));
        }

        Ok(Self {
            id: PureMetalLotId::new(),
            tenant_id,
            source,
            source_id,
            sale_id,
            description: description.into(),
            metal_type,
            initial_grams: grams,
            remaining_grams: grams,
            purity,
            status: PureMetalLotStatus::Available,
            entry_date,
            audit_info: AuditInfo::default(),
        })
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: PureMetalLotId,
        tenant_id: TenantId,
        source: PureMetalLotSource,
        source_id: Option<Uuid>,
        sale_id: Option<SaleId>,
        description: String,
        metal_type: MetalType,
        initial_grams: Grams,
        remaining_grams: Grams,
        purity: Decimal,
        status: PureMetalLotStatus,
        entry_date: DateTime<Utc>,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            source,
            source_id,
            sale_id,
            description,
            metal_type,
            initial_grams,
            remaining_grams,
            purity,
            status,
            entry_date,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn source(&self) -> PureMetalLotSource {
        self.source
    }

    pub fn source_id(&self) -> Option<Uuid> {
        self.source_id
    }

    pub fn sale_id(&self) -> Option<&SaleId> {
        self.sale_id.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn metal_type(&self) -> MetalType {
        self.metal_type
    }

    pub fn initial_grams(&self) -> Grams {
        self.initial_grams
    }

    pub fn remaining_grams(&self) -> Grams {
        self.remaining_grams
    }

    pub fn purity(&self) -> Decimal {
        self.purity
    }

    pub fn status(&self) -> PureMetalLotStatus {
        self.status
    }

    pub fn entry_date(&self) -> DateTime<Utc> {
        self.entry_date
    }
}

impl Entity for PureMetalLot {
    type Id = PureMetalLotId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for PureMetalLot {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
