//! 混合收款编排器
//!
//! 将一条多腿结算指令原子地应用到应收账款上：信用转移先行（不计入回款），
//! 随后现金、金属信用、实物金属三类支付腿依次入账，更新应收双腿余额、
//! 摊销分期、判定全额收款，提交后在新事务中触发销售调整重算。

use std::sync::Arc;

use aurum_domain_core::{Entity, Grams, MetalType, Money};
use aurum_errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::adjustment::AdjustmentEngine;
use crate::application::commands::{
    HybridSettlementCommand, PaymentLeg, ReceiveInstallmentCommand, SinglePayment,
};
use crate::domain::entities::{
    AccountRec, NewTransaction, PureMetalLot, PureMetalLotSource, Sale, Transaction,
};
use crate::domain::enums::{MetalAccountEntryType, TransactionType};
use crate::domain::repositories::{QuotationLookup, SettingsLookup, SettlementAccounts};
use crate::domain::unit_of_work::{SettlementUnitOfWork, UnitOfWorkFactory};
use crate::domain::value_objects::SaleInstallmentId;

/// 结算结果：更新后的应收与超额收款
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub account_rec: AccountRec,
    /// 超出应收名义额的收款（容差内忽略）
    pub overpayment_brl: Money,
    pub overpayment_grams: Grams,
}

/// 混合收款编排器
pub struct SettlementHandler {
    uow_factory: Arc<dyn UnitOfWorkFactory>,
    quotations: Arc<dyn QuotationLookup>,
    settings: Arc<dyn SettingsLookup>,
}

impl SettlementHandler {
    pub fn new(
        uow_factory: Arc<dyn UnitOfWorkFactory>,
        quotations: Arc<dyn QuotationLookup>,
        settings: Arc<dyn SettingsLookup>,
    ) -> Self {
        Self {
            uow_factory,
            quotations,
            settings,
        }
    }

    /// 应用一条混合结算指令
    ///
    /// 全部腿在同一可串行化事务内生效，任一腿失败整体回滚；
    /// 事务提交后在新事务中触发销售调整重算。
    pub async fn execute(&self, cmd: HybridSettlementCommand) -> AppResult<SettlementOutcome> {
        cmd.validate()?;

        let accounts = self.settings.settlement_accounts(&cmd.tenant_id).await?;

        let uow = self.uow_factory.begin().await?;
        let result = self.apply_instruction(uow.as_ref(), &cmd, &accounts).await;

        let (outcome, linked_sale) = match result {
            Ok(value) => value,
            Err(e) => {
                uow.rollback().await?;
                return Err(e);
            }
        };
        uow.commit().await?;

        // 调整重算在原事务边界之外运行
        if let Some(sale_id) = linked_sale {
            AdjustmentEngine::recalculate_standalone(
                self.uow_factory.as_ref(),
                &sale_id,
                &cmd.tenant_id,
            )
            .await?;
        }

        info!(
            account_rec_id = %cmd.account_rec_id,
            received = outcome.account_rec.received(),
            "Hybrid settlement processed"
        );
        Ok(outcome)
    }

    /// 单期定向收款：展开为单腿混合结算指令
    pub async fn receive_installment(
        &self,
        cmd: ReceiveInstallmentCommand,
    ) -> AppResult<SettlementOutcome> {
        // 预校验分期存在且未结清，并解析其应收
        let uow = self.uow_factory.begin().await?;
        let installment = uow
            .installments()
            .find_by_id(&cmd.installment_id, &cmd.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("分期 {} 不存在", cmd.installment_id))
            })?;

        if installment.status().is_paid() {
            uow.rollback().await?;
            return Err(AppError::failed_precondition("该分期已结清"));
        }
        let Some(account_rec_id) = installment.account_rec_id().copied() else {
            uow.rollback().await?;
            return Err(AppError::validation("该分期未关联应收账款"));
        };
        uow.rollback().await?;

        let leg = match cmd.payment {
            SinglePayment::Cash {
                current_account_id,
                amount,
            } => PaymentLeg::Cash {
                current_account_id,
                amount,
                received_at: None,
                quotation: None,
            },
            SinglePayment::MetalCredit {
                metal_credit_id,
                amount_in_grams,
            } => PaymentLeg::MetalCredit {
                metal_credit_id,
                amount_in_grams,
                quotation: None,
            },
            SinglePayment::PhysicalMetal {
                metal_type,
                amount_in_grams,
                purity,
            } => PaymentLeg::PhysicalMetal {
                metal_type,
                amount_in_grams,
                purity,
                quotation: None,
            },
        };

        self.execute(HybridSettlementCommand {
            tenant_id: cmd.tenant_id,
            user_id: cmd.user_id,
            account_rec_id,
            legs: vec![leg],
            received_at: cmd.received_at,
            quotation: cmd.quotation,
            finalize: true,
            installment_id: Some(cmd.installment_id),
        })
        .await
    }

    /// 在事务内应用全部支付腿
    async fn apply_instruction(
        &self,
        uow: &dyn SettlementUnitOfWork,
        cmd: &HybridSettlementCommand,
        accounts: &SettlementAccounts,
    ) -> AppResult<(SettlementOutcome, Option<crate::domain::value_objects::SaleId>)> {
        let mut account_rec = uow
            .receivables()
            .find_by_id(&cmd.account_rec_id, &cmd.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("应收账款 {} 不存在", cmd.account_rec_id))
            })?;

        if account_rec.received() {
            return Err(AppError::failed_precondition(format!(
                "应收账款 {} 已收讫，不能重复结算",
                cmd.account_rec_id
            )));
        }

        let sale = match account_rec.sale_id() {
            Some(sale_id) => Some(
                uow.sales()
                    .find_by_id(sale_id, &cmd.tenant_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::not_found(format!("销售单 {} 不存在", sale_id))
                    })?,
            ),
            None => None,
        };

        // 1. 定向分期必须属于该应收背后的销售单
        let targeted_installment = match cmd.installment_id {
            Some(installment_id) => {
                Some(self.verify_installment(uow, cmd, &installment_id, &account_rec).await?)
            }
            None => None,
        };

        // 2. 信用转移先行：分流资金，不计入本应收的回款
        for leg in &cmd.legs {
            if let PaymentLeg::CreditTransfer {
                target_metal_credit_id,
                amount_in_grams,
                quotation,
            } = leg
            {
                self.apply_credit_transfer(
                    uow,
                    cmd,
                    accounts,
                    sale.as_ref(),
                    target_metal_credit_id,
                    *amount_in_grams,
                    *quotation,
                )
                .await?;
            }
        }

        // 3/4/5. 现金、金属信用、实物金属依次入账并累计回款
        let mut total_paid_brl = Money::ZERO;
        let mut total_paid_grams = Grams::ZERO;
        let mut settlement_quotation: Option<Decimal> = None;

        for leg in &cmd.legs {
            match leg {
                PaymentLeg::Cash {
                    current_account_id,
                    amount,
                    received_at,
                    quotation,
                } => {
                    let date = received_at.unwrap_or(cmd.received_at);
                    let resolved = self
                        .resolve_quotation(*quotation, cmd, MetalType::Gold, date)
                        .await?;
                    if resolved.is_none() && account_rec.is_gold_denominated() {
                        return Err(AppError::validation(
                            "金属计价的应收进行现金收款时必须提供报价",
                        ));
                    }

                    let gold_equivalent = resolved
                        .and_then(|q| amount.to_grams(q))
                        .unwrap_or(Grams::ZERO);

                    let tx = Transaction::create(NewTransaction {
                        tenant_id: cmd.tenant_id,
                        transaction_type: TransactionType::Credit,
                        amount: *amount,
                        gold_amount: Some(Grams::new(gold_equivalent.rounded())),
                        gold_price: resolved,
                        description: settlement_description(&account_rec, sale.as_ref()),
                        occurred_at: date,
                        ledger_account_id: accounts.require_revenue()?,
                        current_account_id: Some(*current_account_id),
                        account_rec_id: Some(*account_rec.id()),
                    });
                    uow.transactions().save(&tx).await?;

                    total_paid_brl += *amount;
                    total_paid_grams += gold_equivalent;
                    settlement_quotation = settlement_quotation.or(resolved);
                }
                PaymentLeg::MetalCredit {
                    metal_credit_id,
                    amount_in_grams,
                    quotation,
                } => {
                    let sale = sale.as_ref().ok_or_else(|| {
                        AppError::validation(
                            "金属信用抵扣只能应用于销售关联的应收账款",
                        )
                    })?;

                    let mut credit = uow
                        .metal_credits()
                        .find_by_id(metal_credit_id, &cmd.tenant_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!(
                                "金属信用 {} 不存在",
                                metal_credit_id
                            ))
                        })?;

                    let resolved = self
                        .resolve_quotation(*quotation, cmd, credit.metal_type(), cmd.received_at)
                        .await?
                        .ok_or_else(|| {
                            AppError::validation("金属信用抵扣必须提供报价")
                        })?;

                    credit.draw_down(*amount_in_grams)?;
                    uow.metal_credits().update(&credit).await?;

                    // 客户金属台账借记
                    let metal_account = uow
                        .metal_accounts()
                        .find_by_person(sale.person_id(), credit.metal_type(), &cmd.tenant_id)
                        .await?
                        .ok_or_else(|| {
                            AppError::not_found(format!(
                                "客户 {} 的金属台账（{}）不存在",
                                sale.person_id(),
                                credit.metal_type()
                            ))
                        })?;
                    let entry = metal_account.debit_entry(
                        cmd.received_at,
                        format!("Payment for sale #{} with metal credit", sale.order_number()),
                        *amount_in_grams,
                        MetalAccountEntryType::SalePayment,
                        Some(sale.id().0),
                    );
                    uow.metal_accounts().add_entry(&entry).await?;

                    let amount_brl = amount_in_grams.value_at(resolved);
                    let tx = Transaction::create(NewTransaction {
                        tenant_id: cmd.tenant_id,
                        transaction_type: TransactionType::Credit,
                        amount: Money::new(amount_brl.rounded()),
                        gold_amount: Some(Grams::new(amount_in_grams.rounded())),
                        gold_price: Some(resolved),
                        description: format!(
                            "Payment for sale #{} with metal credit",
                            sale.order_number()
                        ),
                        occurred_at: cmd.received_at,
                        ledger_account_id: accounts.require_revenue()?,
                        current_account_id: None,
                        account_rec_id: Some(*account_rec.id()),
                    });
                    uow.transactions().save(&tx).await?;

                    total_paid_brl += amount_brl;
                    total_paid_grams += *amount_in_grams;
                    settlement_quotation = settlement_quotation.or(Some(resolved));
                }
                PaymentLeg::PhysicalMetal {
                    metal_type,
                    amount_in_grams,
                    purity,
                    quotation,
                } => {
                    let resolved = self
                        .resolve_quotation(*quotation, cmd, *metal_type, cmd.received_at)
                        .await?
                        .ok_or_else(|| {
                            AppError::validation("实物金属收款必须提供报价")
                        })?;

                    let lot = PureMetalLot::receive(
                        cmd.tenant_id,
                        PureMetalLotSource::SalePayment,
                        Some(account_rec.id().0),
                        account_rec.sale_id().copied(),
                        settlement_description(&account_rec, sale.as_ref()),
                        *metal_type,
                        *amount_in_grams,
                        *purity,
                        cmd.received_at,
                    )?;
                    uow.pure_metal_lots().save(&lot).await?;

                    let amount_brl = amount_in_grams.value_at(resolved);
                    let tx = Transaction::create(NewTransaction {
                        tenant_id: cmd.tenant_id,
                        transaction_type: TransactionType::Credit,
                        amount: Money::new(amount_brl.rounded()),
                        gold_amount: Some(Grams::new(amount_in_grams.rounded())),
                        gold_price: Some(resolved),
                        description: settlement_description(&account_rec, sale.as_ref()),
                        occurred_at: cmd.received_at,
                        ledger_account_id: accounts.require_metal_stock()?,
                        current_account_id: None,
                        account_rec_id: Some(*account_rec.id()),
                    });
                    uow.transactions().save(&tx).await?;

                    total_paid_brl += amount_brl;
                    total_paid_grams += *amount_in_grams;
                    settlement_quotation = settlement_quotation.or(Some(resolved));
                }
                PaymentLeg::CreditTransfer { .. } => {
                    // 已在前置阶段处理
                }
            }
        }

        // 6. 更新应收双腿余额
        account_rec.register_payment(total_paid_brl, total_paid_grams)?;

        // 7. 摊销分期
        if let Some(mut installment) = targeted_installment {
            installment.mark_paid(cmd.received_at);
            uow.installments().update(&installment).await?;
        } else {
            let mut remaining = total_paid_brl;
            let open_installments = uow
                .installments()
                .find_by_account_rec(account_rec.id(), &cmd.tenant_id)
                .await?;
            for mut installment in open_installments {
                if !remaining.is_positive() {
                    break;
                }
                let consumed = installment.apply_amortization(remaining, cmd.received_at);
                if consumed.is_positive() {
                    uow.installments().update(&installment).await?;
                    remaining -= consumed;
                }
            }
        }

        // 8/9. 全额收款判定与收尾
        let fully_paid = account_rec.is_fully_paid();
        let mut sale = sale;
        let mut linked_sale_id = None;

        if fully_paid && cmd.finalize {
            account_rec.mark_received(cmd.received_at);
        }

        if let Some(sale_ref) = sale.as_mut() {
            linked_sale_id = Some(*sale_ref.id());
            if !account_rec.do_not_update_sale_status() {
                if fully_paid && cmd.finalize {
                    if !sale_ref.status().is_finalized() {
                        sale_ref.finalize()?;
                    }
                } else if total_paid_brl.is_positive() || total_paid_grams.is_positive() {
                    sale_ref.mark_partially_paid();
                }
                uow.sales().update(sale_ref).await?;
            }
        }

        uow.receivables().update(&account_rec).await?;

        // 超额收款：金属计价应收按报价折算名义额比较
        let outcome = Self::compute_overpayment(&account_rec, settlement_quotation);

        Ok((outcome, linked_sale_id))
    }

    /// 校验定向分期归属
    async fn verify_installment(
        &self,
        uow: &dyn SettlementUnitOfWork,
        cmd: &HybridSettlementCommand,
        installment_id: &SaleInstallmentId,
        account_rec: &AccountRec,
    ) -> AppResult<crate::domain::entities::SaleInstallment> {
        let installment = uow
            .installments()
            .find_by_id(installment_id, &cmd.tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("分期 {} 不存在", installment_id)))?;

        let belongs = account_rec
            .sale_id()
            .is_some_and(|sale_id| installment.sale_id() == sale_id);
        if !belongs {
            return Err(AppError::failed_precondition(format!(
                "分期 {} 不属于该应收背后的销售单",
                installment_id
            )));
        }
        Ok(installment)
    }

    /// 信用转移：划转到其他客户的金属信用
    #[allow(clippy::too_many_arguments)]
    async fn apply_credit_transfer(
        &self,
        uow: &dyn SettlementUnitOfWork,
        cmd: &HybridSettlementCommand,
        accounts: &SettlementAccounts,
        sale: Option<&Sale>,
        target_credit_id: &crate::domain::value_objects::MetalCreditId,
        grams: Grams,
        quotation: Decimal,
    ) -> AppResult<()> {
        let mut credit = uow
            .metal_credits()
            .find_by_id(target_credit_id, &cmd.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("金属信用 {} 不存在", target_credit_id))
            })?;

        // 拒绝转给本单客户自己
        if let Some(sale) = sale {
            if credit.client_id() == sale.person_id() {
                return Err(AppError::validation(
                    "不能向本单客户自身的金属信用转移",
                ));
            }
        }

        credit.draw_down(grams)?;
        uow.metal_credits().update(&credit).await?;

        // 目标客户金属台账借记
        let metal_account = uow
            .metal_accounts()
            .find_by_person(credit.client_id(), credit.metal_type(), &cmd.tenant_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "客户 {} 的金属台账（{}）不存在",
                    credit.client_id(),
                    credit.metal_type()
                ))
            })?;
        let entry = metal_account.debit_entry(
            cmd.received_at,
            "Metal credit settled via customer payment".to_string(),
            grams,
            MetalAccountEntryType::CreditTransfer,
            Some(target_credit_id.0),
        );
        uow.metal_accounts().add_entry(&entry).await?;

        // 内部重分配的借/贷配对流水
        let amount_brl = Money::new(grams.value_at(quotation).rounded());
        let description = format!(
            "Internal reallocation to metal credit {}",
            target_credit_id
        );
        let mut debit = Transaction::create(NewTransaction {
            tenant_id: cmd.tenant_id,
            transaction_type: TransactionType::Debit,
            amount: amount_brl,
            gold_amount: Some(Grams::new(grams.rounded())),
            gold_price: Some(quotation),
            description: description.clone(),
            occurred_at: cmd.received_at,
            ledger_account_id: accounts.require_metal_credit_payable()?,
            current_account_id: None,
            account_rec_id: None,
        });
        let mut credit_tx = Transaction::create(NewTransaction {
            tenant_id: cmd.tenant_id,
            transaction_type: TransactionType::Credit,
            amount: amount_brl,
            gold_amount: Some(Grams::new(grams.rounded())),
            gold_price: Some(quotation),
            description,
            occurred_at: cmd.received_at,
            ledger_account_id: accounts.require_revenue()?,
            current_account_id: None,
            account_rec_id: None,
        });
        debit.link_with(&mut credit_tx);
        uow.transactions().save(&debit).await?;
        uow.transactions().save(&credit_tx).await?;

        Ok(())
    }

    /// 报价解析：腿级 → 指令级 → 当日行情买入价 → 截至当日的最近行情
    async fn resolve_quotation(
        &self,
        leg_quotation: Option<Decimal>,
        cmd: &HybridSettlementCommand,
        metal: MetalType,
        date: DateTime<Utc>,
    ) -> AppResult<Option<Decimal>> {
        if let Some(q) = leg_quotation {
            return Ok(Some(q));
        }
        if let Some(q) = cmd.quotation {
            return Ok(Some(q));
        }
        let quote = match self
            .quotations
            .find_by_date(date, metal, &cmd.tenant_id)
            .await?
        {
            Some(quote) => Some(quote),
            None => {
                self.quotations
                    .find_latest(metal, &cmd.tenant_id, date)
                    .await?
            }
        };
        Ok(quote
            .filter(|q| q.has_usable_buy_price())
            .map(|q| q.buy_price))
    }

    /// 计算超额收款（两种计量单位）
    fn compute_overpayment(
        account_rec: &AccountRec,
        quotation: Option<Decimal>,
    ) -> SettlementOutcome {
        let nominal_brl = match (account_rec.gold_amount(), quotation) {
            (Some(gold_amount), Some(q)) if gold_amount.is_positive() => gold_amount.value_at(q),
            _ => account_rec.amount(),
        };

        let overpayment = account_rec.amount_paid() - nominal_brl;
        let (overpayment_brl, overpayment_grams) = if overpayment.is_positive() {
            let grams = quotation
                .and_then(|q| overpayment.to_grams(q))
                .unwrap_or(Grams::ZERO);
            (overpayment, grams)
        } else {
            (Money::ZERO, Grams::ZERO)
        };

        if overpayment_brl.exceeds_tolerance_over(Money::ZERO) {
            warn!(
                account_rec_id = %account_rec.id(),
                overpayment = %overpayment_brl,
                "Overpayment above tolerance, credit should be issued"
            );
        }

        SettlementOutcome {
            account_rec: account_rec.clone(),
            overpayment_brl,
            overpayment_grams,
        }
    }
}

/// 收款流水描述
fn settlement_description(account_rec: &AccountRec, sale: Option<&Sale>) -> String {
    match sale {
        Some(sale) => format!("Payment received for sale #{}", sale.order_number()),
        None => format!("Payment received for {}", account_rec.description()),
    }
}
