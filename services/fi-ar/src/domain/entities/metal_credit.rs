//! 金属信用聚合根

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, MetalType};
use aurum_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::domain::enums::MetalCreditStatus;
use crate::domain::value_objects::{MetalCreditId, PersonId};

/// 金属信用
///
/// 公司欠客户的克重余额（如化验残渣折算）。结算时抵扣，
/// 剩余克重低于 0.0001g 即视为结清。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalCredit {
    id: MetalCreditId,
    tenant_id: TenantId,
    client_id: PersonId,
    metal_type: MetalType,
    grams: Grams,
    settled_grams: Grams,
    status: MetalCreditStatus,
    audit_info: AuditInfo,
}

impl MetalCredit {
    pub fn new(
        tenant_id: TenantId,
        client_id: PersonId,
        metal_type: MetalType,
        grams: Grams,
    ) -> Self {
        Self {
            id: MetalCreditId::new(),
            tenant_id,
            client_id,
            metal_type,
            grams,
            settled_grams: Grams::ZERO,
            status: MetalCreditStatus::Open,
            audit_info: AuditInfo::default(),
        }
    }

    /// 从持久化状态还原
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: MetalCreditId,
        tenant_id: TenantId,
        client_id: PersonId,
        metal_type: MetalType,
        grams: Grams,
        settled_grams: Grams,
        status: MetalCreditStatus,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            client_id,
            metal_type,
            grams,
            settled_grams,
            status,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn client_id(&self) -> &PersonId {
        &self.client_id
    }

    pub fn metal_type(&self) -> MetalType {
        self.metal_type
    }

    pub fn grams(&self) -> Grams {
        self.grams
    }

    pub fn settled_grams(&self) -> Grams {
        self.settled_grams
    }

    pub fn status(&self) -> MetalCreditStatus {
        self.status
    }

    /// 抵扣克重
    ///
    /// 余额不足或克重非正时拒绝，信用保持原状。
    pub fn draw_down(&mut self, grams: Grams) -> AppResult<()> {
        if !grams.is_positive() {
            return Err(AppError::validation("抵扣克重必须为正数".to_string()));
        }
        if self.grams < grams {
            return Err(AppError::validation(format!(
                "金属信用余额不足。可用: {}, 申请: {}",
                self.grams, grams
            )));
        }

        self.grams -= grams;
        self.settled_grams += grams;
        self.status = if self.grams.is_negligible() {
            MetalCreditStatus::Paid
        } else {
            MetalCreditStatus::PartiallyPaid
        };
        self.audit_info.update(None);
        Ok(())
    }
}

impl Entity for MetalCredit {
    type Id = MetalCreditId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for MetalCredit {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
