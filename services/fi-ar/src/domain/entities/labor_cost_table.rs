//! 工费表

use aurum_common::TenantId;
use aurum_domain_core::{Entity, Grams};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::LaborCostEntryId;

/// 工费表条目
///
/// 按整单期望克重区间收取固定克重工费；`max_grams` 为空表示上不封顶。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaborCostBracket {
    id: LaborCostEntryId,
    tenant_id: TenantId,
    min_grams: Grams,
    max_grams: Option<Grams>,
    gold_grams_charged: Grams,
}

impl LaborCostBracket {
    pub fn new(
        tenant_id: TenantId,
        min_grams: Grams,
        max_grams: Option<Grams>,
        gold_grams_charged: Grams,
    ) -> Self {
        Self {
            id: LaborCostEntryId::new(),
            tenant_id,
            min_grams,
            max_grams,
            gold_grams_charged,
        }
    }

    pub fn restore(
        id: LaborCostEntryId,
        tenant_id: TenantId,
        min_grams: Grams,
        max_grams: Option<Grams>,
        gold_grams_charged: Grams,
    ) -> Self {
        Self {
            id,
            tenant_id,
            min_grams,
            max_grams,
            gold_grams_charged,
        }
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn min_grams(&self) -> Grams {
        self.min_grams
    }

    pub fn max_grams(&self) -> Option<Grams> {
        self.max_grams
    }

    pub fn gold_grams_charged(&self) -> Grams {
        self.gold_grams_charged
    }

    /// 区间是否覆盖给定克重
    pub fn applies_to(&self, total_grams: Grams) -> bool {
        self.min_grams <= total_grams && self.max_grams.is_none_or(|max| max >= total_grams)
    }
}

impl Entity for LaborCostBracket {
    type Id = LaborCostEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// 整单工费查表：返回首个覆盖该克重的区间收费，查不到记零
pub fn lookup_labor_grams(brackets: &[LaborCostBracket], total_grams: Grams) -> Grams {
    brackets
        .iter()
        .find(|bracket| bracket.applies_to(total_grams))
        .map(|bracket| bracket.gold_grams_charged())
        .unwrap_or(Grams::ZERO)
}
