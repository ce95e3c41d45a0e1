//! 金属台账聚合根

use aurum_common::{AuditInfo, TenantId};
use aurum_domain_core::{AggregateRoot, Entity, Grams, MetalType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::enums::MetalAccountEntryType;
use crate::domain::value_objects::{MetalAccountEntryId, MetalAccountId, PersonId};

/// 金属台账分录
///
/// 仅追加，按方向带符号记克重：贷记为正，借记为负。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalAccountEntry {
    id: MetalAccountEntryId,
    metal_account_id: MetalAccountId,
    date: DateTime<Utc>,
    description: String,
    grams: Grams,
    entry_type: MetalAccountEntryType,
    /// 来源单据（销售单、流水等）
    source_id: Option<Uuid>,
}

impl MetalAccountEntry {
    pub fn new(
        metal_account_id: MetalAccountId,
        date: DateTime<Utc>,
        description: impl Into<String>,
        grams: Grams,
        entry_type: MetalAccountEntryType,
        source_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: MetalAccountEntryId::new(),
            metal_account_id,
            date,
            description: description.into(),
            grams,
            entry_type,
            source_id,
        }
    }

    pub fn restore(
        id: MetalAccountEntryId,
        metal_account_id: MetalAccountId,
        date: DateTime<Utc>,
        description: String,
        grams: Grams,
        entry_type: MetalAccountEntryType,
        source_id: Option<Uuid>,
    ) -> Self {
        Self {
            id,
            metal_account_id,
            date,
            description,
            grams,
            entry_type,
            source_id,
        }
    }

    pub fn metal_account_id(&self) -> &MetalAccountId {
        &self.metal_account_id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn grams(&self) -> Grams {
        self.grams
    }

    pub fn entry_type(&self) -> MetalAccountEntryType {
        self.entry_type
    }

    pub fn source_id(&self) -> Option<Uuid> {
        self.source_id
    }
}

impl Entity for MetalAccountEntry {
    type Id = MetalAccountEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 金属台账
///
/// 每个往来方每种金属一条台账，与货币无关的克重流水账。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetalAccount {
    id: MetalAccountId,
    tenant_id: TenantId,
    person_id: PersonId,
    metal_type: MetalType,
    audit_info: AuditInfo,
}

impl MetalAccount {
    pub fn new(tenant_id: TenantId, person_id: PersonId, metal_type: MetalType) -> Self {
        Self {
            id: MetalAccountId::new(),
            tenant_id,
            person_id,
            metal_type,
            audit_info: AuditInfo::default(),
        }
    }

    pub fn restore(
        id: MetalAccountId,
        tenant_id: TenantId,
        person_id: PersonId,
        metal_type: MetalType,
        audit_info: AuditInfo,
    ) -> Self {
        Self {
            id,
            tenant_id,
            person_id,
            metal_type,
            audit_info,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn person_id(&self) -> &PersonId {
        &self.person_id
    }

    pub fn metal_type(&self) -> MetalType {
        self.metal_type
    }

    /// 借记分录（客户侧扣减）
    pub fn debit_entry(
        &self,
        date: DateTime<Utc>,
        description: impl Into<String>,
        grams: Grams,
        entry_type: MetalAccountEntryType,
        source_id: Option<Uuid>,
    ) -> MetalAccountEntry {
        MetalAccountEntry::new(self.id, date, description, -grams, entry_type, source_id)
    }

    /// 贷记分录（客户侧增加）
    pub fn credit_entry(
        &self,
        date: DateTime<Utc>,
        description: impl Into<String>,
        grams: Grams,
        entry_type: MetalAccountEntryType,
        source_id: Option<Uuid>,
    ) -> MetalAccountEntry {
        MetalAccountEntry::new(self.id, date, description, grams, entry_type, source_id)
    }
}

impl Entity for MetalAccount {
    type Id = MetalAccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for MetalAccount {
    fn audit_info(&self) -> &AuditInfo {
        &self.audit_info
    }

    fn audit_info_mut(&mut self) -> &mut AuditInfo {
        &mut self.audit_info
    }
}
