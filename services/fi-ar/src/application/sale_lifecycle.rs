//! 销售单生命周期用例
//!
//! 确认（生成应收与分期/即时收款）、完结（触发调整重算）、
//! 冲销（反向流水 + 应收/分期复位）与取消。

use std::sync::Arc;

use aurum_common::TenantId;
use aurum_domain_core::{Entity, Grams, Money};
use aurum_errors::{AppError, AppResult};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::info;

use crate::application::adjustment::{AdjustmentEngine, AdjustmentOutcome};
use crate::application::commands::ConfirmSaleCommand;
use crate::domain::entities::{AccountRec, NewTransaction, SaleInstallment, Transaction};
use crate::domain::enums::{PaymentMethod, TransactionType};
use crate::domain::repositories::SettingsLookup;
use crate::domain::unit_of_work::UnitOfWorkFactory;
use crate::domain::value_objects::SaleId;

/// 销售单生命周期处理器
pub struct SaleLifecycleHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    settings: Arc<dyn SettingsLookup>,
}

impl SaleLifecycleHandler {
    pub fn new(uow_factory: Arc<dyn UnitOfWorkFactory>, settings: Arc<dyn SettingsLookup>) -> Self {
        Self {
            uow_factory,
            settings,
        }
    }

    /// 确认销售单
    ///
    /// 账期/信用卡销售生成应收与分期；现款现付直接登记收款流水。
    pub async fn confirm_sale(&self, cmd: ConfirmSaleCommand) -> AppResult<()> {
        cmd.validate()?;

        let accounts = self.settings.settlement_accounts(&cmd.tenant_id).await?;
        let uow = self.uow_factory.begin().await?;

        let result: AppResult<()> = async {
            let mut sale = uow
                .sales()
                .find_by_id(&cmd.sale_id, &cmd.tenant_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("销售单 {} 不存在", cmd.sale_id)))?;

            // 确认时点可更新报价，期望克重随之重算
            if let Some(updated_price) = cmd.updated_gold_price {
                if updated_price != sale.gold_price() {
                    let gold_value = sale
                        .net_amount()
                        .to_grams(updated_price)
                        .unwrap_or(Grams::ZERO);
                    sale.reprice(updated_price, gold_value);
                }
            }

            match cmd.payment_method {
                PaymentMethod::CashUpfront => {
                    let current_account_id = cmd.current_account_id.ok_or_else(|| {
                        AppError::validation("现款现付的销售单必须指定入账资金账户")
                    })?;
                    let gold_equivalent = if sale.gold_price() > Decimal::ZERO {
                        sale.net_amount()
                            .to_grams(sale.gold_price())
                            .unwrap_or(Grams::ZERO)
                    } else {
                        Grams::ZERO
                    };
                    let tx = Transaction::create(NewTransaction {
                        tenant_id: cmd.tenant_id,
                        transaction_type: TransactionType::Credit,
                        amount: sale.net_amount(),
                        gold_amount: Some(Grams::new(gold_equivalent.rounded())),
                        gold_price: Some(sale.gold_price()),
                        description: format!(
                            "Payment received for sale #{}",
                            sale.order_number()
                        ),
                        occurred_at: Utc::now(),
                        ledger_account_id: accounts.require_revenue()?,
                        current_account_id: Some(current_account_id),
                        account_rec_id: None,
                    });
                    uow.transactions().save(&tx).await?;
                }
                PaymentMethod::Installments | PaymentMethod::CreditCard => {
                    let plan = cmd.installment_plan.clone().unwrap_or(
                        crate::application::commands::InstallmentPlan {
                            count: 1,
                            first_due_date: Utc::now() + Duration::days(30),
                        },
                    );

                    let account_rec = AccountRec::new(
                        cmd.tenant_id,
                        Some(*sale.id()),
                        Some(*sale.person_id()),
                        format!("Receivable for sale #{}", sale.order_number()),
                        sale.net_amount(),
                        None,
                        plan.first_due_date,
                    );
                    uow.receivables().save(&account_rec).await?;

                    let count = plan.count.max(1);
                    let installment_value =
                        Money::new(sale.net_amount().value() / Decimal::from(count));
                    for number in 1..=count {
                        let due_date =
                            plan.first_due_date + Duration::days(30 * (number as i64 - 1));
                        let installment = SaleInstallment::new(
                            cmd.tenant_id,
                            *sale.id(),
                            Some(*account_rec.id()),
                            number as i32,
                            installment_value,
                            due_date,
                        );
                        uow.installments().save(&installment).await?;
                    }
                }
                PaymentMethod::Metal => {
                    // 金属计价销售的应收在完结时生成（含克重腿）
                }
            }

            sale.confirm()?;
            uow.sales().update(&sale).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                uow.commit().await?;
                info!(sale_id = %cmd.sale_id, "Sale confirmed");
                Ok(())
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    /// 完结销售单并触发调整重算
    pub async fn finalize_sale(
        &self,
        tenant_id: &TenantId,
        sale_id: &SaleId,
    ) -> AppResult<AdjustmentOutcome> {
        let uow = self.uow_factory.begin().await?;

        let result: AppResult<()> = async {
            let mut sale = uow
                .sales()
                .find_by_id(sale_id, tenant_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("销售单 {} 不存在", sale_id)))?;

            // 金属计价销售在完结时生成带克重腿的应收
            if sale.payment_method() == PaymentMethod::Metal {
                let existing = uow.receivables().find_by_sale(sale_id, tenant_id).await?;
                if existing.is_empty() {
                    if !sale.gold_value().is_positive() {
                        return Err(AppError::validation(
                            "金属计价销售的期望克重必须为正数，无法生成应收",
                        ));
                    }
                    let account_rec = AccountRec::new(
                        *tenant_id,
                        Some(*sale.id()),
                        Some(*sale.person_id()),
                        format!("Metal receivable for sale #{}", sale.order_number()),
                        sale.net_amount(),
                        Some(sale.gold_value()),
                        Utc::now() + Duration::days(7),
                    );
                    uow.receivables().save(&account_rec).await?;
                }
            }

            sale.finalize()?;
            uow.sales().update(&sale).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => uow.commit().await?,
            Err(e) => {
                uow.rollback().await?;
                return Err(e);
            }
        }

        // 调整重算作为后续步骤在新事务中运行
        let outcome =
            AdjustmentEngine::recalculate_standalone(self.uow_factory.as_ref(), sale_id, tenant_id)
                .await?;
        info!(sale_id = %sale_id, outcome = ?outcome, "Sale finalized");
        Ok(outcome)
    }

    /// 冲销销售单
    ///
    /// 为每笔有效贷记流水生成反向流水（双双标记 Adjusted），
    /// 应收与分期复位，销售单回到待处理。
    pub async fn revert_sale(&self, tenant_id: &TenantId, sale_id: &SaleId) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let result: AppResult<()> = async {
            let mut sale = uow
                .sales()
                .find_by_id(sale_id, tenant_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("销售单 {} 不存在", sale_id)))?;

            let receivables = uow.receivables().find_by_sale(sale_id, tenant_id).await?;
            for mut receivable in receivables {
                let transactions = uow
                    .transactions()
                    .find_by_account_rec(receivable.id(), tenant_id)
                    .await?;
                for mut tx in transactions {
                    if tx.is_active() && tx.transaction_type() == TransactionType::Credit {
                        let mut reversal = tx.offsetting(
                            format!("Reversal for sale #{}", sale.order_number()),
                            Utc::now(),
                        );
                        // 反向流水与原流水都标记 Adjusted，不再参与收款汇总
                        reversal.mark_adjusted();
                        uow.transactions().save(&reversal).await?;
                        tx.mark_adjusted();
                        uow.transactions().update_status(&tx).await?;
                    }
                }

                receivable.reopen();
                uow.receivables().update(&receivable).await?;
            }

            let installments = uow.installments().find_by_sale(sale_id, tenant_id).await?;
            for mut installment in installments {
                installment.reset();
                uow.installments().update(&installment).await?;
            }

            sale.revert_to_pending()?;
            uow.sales().update(&sale).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                uow.commit().await?;
                info!(sale_id = %sale_id, "Sale reverted to pending");
                Ok(())
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }

    /// 取消销售单（完结单据拒绝）
    pub async fn cancel_sale(&self, tenant_id: &TenantId, sale_id: &SaleId) -> AppResult<()> {
        let uow = self.uow_factory.begin().await?;

        let result: AppResult<()> = async {
            let mut sale = uow
                .sales()
                .find_by_id(sale_id, tenant_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("销售单 {} 不存在", sale_id)))?;
            sale.cancel()?;
            uow.sales().update(&sale).await?;
            Ok(())
        }
        .await;

        match result {
            Ok(()) => {
                uow.commit().await?;
                info!(sale_id = %sale_id, "Sale cancelled");
                Ok(())
            }
            Err(e) => {
                uow.rollback().await?;
                Err(e)
            }
        }
    }
}
