//! 销售调整引擎
//!
//! 组合期望产出计算器与收款汇总器，推导每张销售单的差异与利润口径，
//! 整体覆盖写入 SaleAdjustment 并回写销售单派生字段。
//! 可在调用方事务内运行（嵌套），也可自起事务独立运行。

use std::collections::HashMap;

use aurum_common::TenantId;
use aurum_domain_core::{Entity, Grams, Money};
use aurum_errors::{AppError, AppResult};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::{expected_yield, payment_aggregation};
use crate::domain::entities::{AdjustmentFigures, SaleAdjustment, Transaction};
use crate::domain::unit_of_work::{SettlementUnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::{AccountRecId, SaleId};

/// 单次调整运行的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentOutcome {
    /// 已重算并写入
    Written,
    /// 销售单尚未完结，跳过
    SkippedNotFinalized,
    /// 尚无结算流水，跳过
    SkippedNoPayments,
}

/// 销售调整引擎
pub struct AdjustmentEngine;

impl AdjustmentEngine {
    /// 在调用方事务内重算销售调整
    ///
    /// 销售单不在租户范围内时返回 NotFound；其余缺省值一律按零处理。
    pub async fn recalculate(
        uow: &dyn SettlementUnitOfWork,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<AdjustmentOutcome> {
        info!(sale_id = %sale_id, "Recalculating sale adjustment");

        let mut sale = uow
            .sales()
            .find_by_id(sale_id, tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("销售单 {} 不存在", sale_id)))?;

        if !sale.status().is_finalized() {
            warn!(
                sale_id = %sale_id,
                status = ?sale.status(),
                "Sale is not finalized, adjustment not applicable"
            );
            return Ok(AdjustmentOutcome::SkippedNotFinalized);
        }

        // 收集应收：直接关联 + 经分期间接关联，流水按标识去重
        let receivables = uow.receivables().find_by_sale(sale_id, tenant_id).await?;
        let installments = uow.installments().find_by_sale(sale_id, tenant_id).await?;

        let mut account_rec_ids: Vec<AccountRecId> =
            receivables.iter().map(|ar| *ar.id()).collect();
        for installment in &installments {
            if let Some(ar_id) = installment.account_rec_id() {
                if !account_rec_ids.contains(ar_id) {
                    account_rec_ids.push(*ar_id);
                }
            }
        }

        let mut transactions: Vec<Transaction> = Vec::new();
        for ar_id in &account_rec_ids {
            transactions.extend(
                uow.transactions()
                    .find_by_account_rec(ar_id, tenant_id)
                    .await?,
            );
        }

        let totals = payment_aggregation::aggregate(&transactions, sale.gold_price());
        if !totals.has_payments {
            warn!(sale_id = %sale_id, "No settlement transactions found, adjustment skipped");
            return Ok(AdjustmentOutcome::SkippedNoPayments);
        }

        // 期望产出
        let product_ids: Vec<_> = sale.items().iter().map(|i| *i.product_id()).collect();
        let products: HashMap<_, _> = uow
            .products()
            .find_many(&product_ids, tenant_id)
            .await?
            .into_iter()
            .map(|p| (*p.id(), p))
            .collect();
        let brackets = uow.labor_cost_table().list(tenant_id).await?;

        let yield_ = expected_yield::calculate(
            sale.items(),
            &products,
            totals.effective_quotation,
            &brackets,
        );

        let figures = Self::derive_figures(&sale, &totals, &yield_);

        // 整体覆盖写入（create-or-replace，不做合并）
        let adjustment = SaleAdjustment::build(*tenant_id, *sale_id, figures.clone(), Utc::now());
        uow.adjustments().upsert(&adjustment).await?;

        // 回写销售单派生字段：净额与报价以实际收款为准
        sale.apply_adjustment_figures(figures.payment_received_brl, figures.payment_quotation);
        uow.sales().update(&sale).await?;

        // 自动结清快捷路径：克重腿已满足而货币腿仍有名义缺口时，
        // 以克重结清为准，将缺口核销（不生成损失流水）
        if figures
            .payment_equivalent_grams
            .covers(figures.sale_expected_grams)
        {
            for mut receivable in receivables {
                if !receivable.received()
                    && receivable
                        .outstanding_amount()
                        .exceeds_tolerance_over(Money::ZERO)
                {
                    info!(
                        account_rec_id = %receivable.id(),
                        outstanding = %receivable.outstanding_amount(),
                        "Weight leg satisfied, writing down currency residual"
                    );
                    receivable.write_down_to_paid(Utc::now());
                    uow.receivables().update(&receivable).await?;
                }
            }
        }

        info!(sale_id = %sale_id, "Sale adjustment saved");
        Ok(AdjustmentOutcome::Written)
    }

    /// 独立运行：自起事务重算并提交
    pub async fn recalculate_standalone(
        factory: &dyn UnitOfWorkFactory,
        sale_id: &SaleId,
        tenant_id: &TenantId,
    ) -> AppResult<AdjustmentOutcome> {
        let uow = factory.begin().await?;
        match Self::recalculate(uow.as_ref(), sale_id, tenant_id).await {
            Ok(outcome) => {
                uow.commit().await?;
                Ok(outcome)
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    /// 推导调整口径
    ///
    /// 业务规则（照搬，勿重新推导）：工费已包含在成本合计/期望克重口径内，
    /// 净利润与净差异均不再二次扣减工费。
    fn derive_figures(
        sale: &crate::domain::entities::Sale,
        totals: &payment_aggregation::PaymentTotals,
        yield_: &expected_yield::ExpectedYield,
    ) -> AdjustmentFigures {
        let quotation = totals.effective_quotation;

        let gross_discrepancy_grams = totals.equivalent_grams - yield_.expected_grams;

        let costs_brl = sale.shipping_cost();
        let costs_in_grams = if costs_brl.is_zero() || quotation <= Decimal::ZERO {
            Grams::ZERO
        } else {
            costs_brl.to_grams(quotation).unwrap_or(Grams::ZERO)
        };

        let net_discrepancy_grams = gross_discrepancy_grams - costs_in_grams;

        let labor_cost_brl = yield_.labor_grams.value_at(quotation);
        let gross_profit_brl = totals.received_brl - yield_.total_cost_brl;
        let commission_brl = sale.commission_amount();
        let net_profit_brl = gross_profit_brl - costs_brl - commission_brl;

        AdjustmentFigures {
            payment_received_brl: totals.received_brl,
            payment_quotation: quotation,
            payment_equivalent_grams: totals.equivalent_grams,
            sale_expected_grams: yield_.expected_grams,
            gross_discrepancy_grams,
            costs_brl,
            costs_in_grams,
            net_discrepancy_grams,
            labor_cost_in_grams: yield_.labor_grams,
            labor_cost_brl,
            total_cost_brl: yield_.total_cost_brl,
            gross_profit_brl,
            commission_brl,
            net_profit_brl,
        }
    }
}
