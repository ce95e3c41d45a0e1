//! 混合收款编排器场景测试
//!
//! 通过内存 Unit of Work 驱动完整结算用例

mod support;

use std::sync::Arc;

use aurum_domain_core::{Entity, Grams, MetalType};
use aurum_errors::AppError;
use chrono::Utc;

use fi_ar::application::commands::{
    HybridSettlementCommand, PaymentLeg, ReceiveInstallmentCommand, SinglePayment,
};
use fi_ar::application::{SettlementHandler, SettlementOutcome};
use fi_ar::domain::entities::{
    AccountRec, MetalAccount, MetalCredit, Product, Sale, SaleInstallment, SaleItem,
};
use fi_ar::domain::enums::{
    MetalCreditStatus, PaymentMethod, SaleAdjustmentCalcMethod, SaleInstallmentStatus,
    SaleStatus,
};
use fi_ar::domain::value_objects::{AccountRecId, CurrentAccountId, PersonId, SaleId};

use support::{
    InMemoryBackend, InMemoryUowFactory, StaticQuotations, StaticSettings, dec, grams, money,
};

use aurum_common::{TenantId, UserId};

// ============================================================
// 测试夹具
// ============================================================

struct Fixture {
    backend: InMemoryBackend,
    handler: SettlementHandler,
    tenant: TenantId,
}

impl Fixture {
    fn new(quotations: StaticQuotations) -> Self {
        let backend = InMemoryBackend::new();
        let handler = SettlementHandler::new(
            Arc::new(InMemoryUowFactory::new(backend.clone())),
            Arc::new(quotations),
            Arc::new(StaticSettings::configured()),
        );
        Self {
            backend,
            handler,
            tenant: TenantId::new(),
        }
    }

    /// 已确认的销售单（数量法产品，期望 10g）+ 应收
    fn seed_confirmed_sale(
        &self,
        person: PersonId,
        amount: &str,
        gold_amount: Option<&str>,
    ) -> (SaleId, AccountRecId) {
        let product = Product::new(
            self.tenant,
            "Sal de ouro 68%",
            grams("2.0000"),
            SaleAdjustmentCalcMethod::QuantityBased,
        );
        let items = vec![SaleItem::new(
            *product.id(),
            5,
            money("600.00"),
            money("500.00"),
            None,
        )];
        let mut sale = Sale::new(
            self.tenant,
            1001,
            person,
            PaymentMethod::Installments,
            dec("300.00"),
            money(amount),
            money(amount),
            grams("10.0000"),
            items,
        );
        sale.confirm().unwrap();

        let account_rec = AccountRec::new(
            self.tenant,
            Some(*sale.id()),
            Some(person),
            "Receivable for sale #1001",
            money(amount),
            gold_amount.map(grams),
            Utc::now(),
        );

        let sale_id = *sale.id();
        let account_rec_id = *account_rec.id();
        let product_id = product.id().0;
        self.backend.seed(|state| {
            state.products.insert(product_id, product);
            state.sales.insert(sale_id.0, sale);
            state.receivables.insert(account_rec_id.0, account_rec);
        });
        (sale_id, account_rec_id)
    }

    fn command(&self, account_rec_id: AccountRecId, legs: Vec<PaymentLeg>) -> HybridSettlementCommand {
        HybridSettlementCommand {
            tenant_id: self.tenant,
            user_id: UserId::new(),
            account_rec_id,
            legs,
            received_at: Utc::now(),
            quotation: None,
            finalize: false,
            installment_id: None,
        }
    }

    fn receivable(&self, id: AccountRecId) -> AccountRec {
        self.backend
            .read(|state| state.receivables.get(&id.0).cloned())
            .unwrap()
    }

    fn sale(&self, id: SaleId) -> Sale {
        self.backend
            .read(|state| state.sales.get(&id.0).cloned())
            .unwrap()
    }
}

fn cash_leg(amount: &str, quotation: Option<&str>) -> PaymentLeg {
    PaymentLeg::Cash {
        current_account_id: CurrentAccountId::new(),
        amount: money(amount),
        received_at: None,
        quotation: quotation.map(dec),
    }
}

// ============================================================
// 现金腿场景
// ============================================================

#[tokio::test]
async fn test_single_cash_leg_settles_receivable_in_full() {
    let fixture = Fixture::new(StaticQuotations::with_buy_price("300.00"));
    let person = PersonId::new();
    let (sale_id, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    // 两期分期，结清后应全部转 Paid
    let sale = fixture.sale(sale_id);
    fixture.backend.seed(|state| {
        for number in 1..=2 {
            let installment = SaleInstallment::new(
                *sale.tenant_id(),
                sale_id,
                Some(account_rec_id),
                number,
                money("500.00"),
                Utc::now() + chrono::Duration::days(30 * number as i64),
            );
            state
                .installments
                .insert(installment.id().0, installment);
        }
    });

    let mut cmd = fixture.command(account_rec_id, vec![cash_leg("1000.00", None)]);
    cmd.finalize = true;

    let outcome: SettlementOutcome = fixture.handler.execute(cmd).await.unwrap();

    assert!(outcome.account_rec.received());
    assert_eq!(outcome.account_rec.amount_paid().value(), dec("1000.00"));
    assert!(outcome.overpayment_brl.is_zero());
    assert!(outcome.overpayment_grams.is_zero());

    let receivable = fixture.receivable(account_rec_id);
    assert!(receivable.received());

    let statuses: Vec<_> = fixture.backend.read(|state| {
        state
            .installments
            .values()
            .map(|i| i.status())
            .collect()
    });
    assert!(statuses.iter().all(|s| *s == SaleInstallmentStatus::Paid));

    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Finalized);
}

#[tokio::test]
async fn test_cash_leg_round_trip_weight_conversion() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "3000.00", None);

    let cmd = fixture.command(account_rec_id, vec![cash_leg("1500.00", Some("300.00"))]);
    fixture.handler.execute(cmd).await.unwrap();

    let receivable = fixture.receivable(account_rec_id);
    // A/Q = 1500/300 = 5g（±1e-4）
    let diff = (receivable.gold_amount_paid() - grams("5.0000")).value().abs();
    assert!(diff <= dec("0.0001"));

    let tx_grams: Vec<_> = fixture.backend.read(|state| {
        state
            .transactions
            .values()
            .filter_map(|t| t.gold_amount())
            .collect()
    });
    assert_eq!(tx_grams.len(), 1);
    assert!((tx_grams[0] - grams("5.0000")).value().abs() <= dec("0.0001"));
}

#[tokio::test]
async fn test_cash_leg_on_gold_denominated_receivable_requires_quotation() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "3000.00", Some("10.0000"));

    let cmd = fixture.command(account_rec_id, vec![cash_leg("1000.00", None)]);
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_partial_cash_amortizes_installments_in_due_date_order() {
    let fixture = Fixture::new(StaticQuotations::with_buy_price("300.00"));
    let person = PersonId::new();
    let (sale_id, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    let tenant = fixture.tenant;
    let first = SaleInstallment::new(
        tenant,
        sale_id,
        Some(account_rec_id),
        1,
        money("600.00"),
        Utc::now() + chrono::Duration::days(30),
    );
    let second = SaleInstallment::new(
        tenant,
        sale_id,
        Some(account_rec_id),
        2,
        money("400.00"),
        Utc::now() + chrono::Duration::days(60),
    );
    let (first_key, second_key) = (first.id().0, second.id().0);
    fixture.backend.seed(|state| {
        state.installments.insert(first_key, first);
        state.installments.insert(second_key, second);
    });

    let cmd = fixture.command(account_rec_id, vec![cash_leg("700.00", None)]);
    fixture.handler.execute(cmd).await.unwrap();

    let (first_status, second_after) = fixture.backend.read(|state| {
        (
            state.installments[&first_key].status(),
            state.installments[&second_key].clone(),
        )
    });
    assert_eq!(first_status, SaleInstallmentStatus::Paid);
    assert_eq!(second_after.status(), SaleInstallmentStatus::PartiallyPaid);
    assert_eq!(second_after.amount_paid().value(), dec("100.00"));

    // 部分收款：应收未收讫，销售单转部分收款
    let receivable = fixture.receivable(account_rec_id);
    assert!(!receivable.received());
    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::PartiallyPaid);
}

// ============================================================
// 金属信用腿场景
// ============================================================

#[tokio::test]
async fn test_metal_credit_then_cash_settles_gold_denominated_receivable() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (sale_id, account_rec_id) =
        fixture.seed_confirmed_sale(person, "3000.00", Some("10.0000"));

    let credit = MetalCredit::new(fixture.tenant, person, MetalType::Gold, grams("4.0000"));
    let credit_id = *credit.id();
    let metal_account = MetalAccount::new(fixture.tenant, person, MetalType::Gold);
    let account_key = metal_account.id().0;
    fixture.backend.seed(|state| {
        state.metal_credits.insert(credit_id.0, credit);
        state.metal_accounts.insert(account_key, metal_account);
    });

    // 第一步：金属信用抵扣 4g
    let mut cmd = fixture.command(
        account_rec_id,
        vec![PaymentLeg::MetalCredit {
            metal_credit_id: credit_id,
            amount_in_grams: grams("4.0000"),
            quotation: Some(dec("300.00")),
        }],
    );
    cmd.finalize = true;
    fixture.handler.execute(cmd).await.unwrap();

    let after_first = fixture.receivable(account_rec_id);
    assert!(!after_first.received());
    assert_eq!(after_first.gold_amount_paid().value(), dec("4.0000"));

    let credit_after = fixture
        .backend
        .read(|state| state.metal_credits[&credit_id.0].clone());
    assert_eq!(credit_after.grams().value(), dec("0.0000"));
    assert_eq!(credit_after.settled_grams().value(), dec("4.0000"));
    assert_eq!(credit_after.status(), MetalCreditStatus::Paid);

    // 第二步：现金 1800 按同一报价折 6g，克重腿补足
    let mut cmd = fixture.command(account_rec_id, vec![cash_leg("1800.00", Some("300.00"))]);
    cmd.finalize = true;
    fixture.handler.execute(cmd).await.unwrap();

    let after_second = fixture.receivable(account_rec_id);
    assert!(after_second.received());
    let diff = (after_second.gold_amount_paid() - grams("10.0000"))
        .value()
        .abs();
    assert!(diff <= dec("0.0001"));

    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Finalized);

    // 客户金属台账留下借记分录
    let entry_grams: Vec<_> = fixture
        .backend
        .read(|state| state.metal_account_entries.iter().map(|e| e.grams()).collect());
    assert_eq!(entry_grams.len(), 1);
    assert_eq!(entry_grams[0].value(), dec("-4.0000"));
}

#[tokio::test]
async fn test_insufficient_metal_credit_aborts_whole_instruction() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "3000.00", Some("10.0000"));

    let credit = MetalCredit::new(fixture.tenant, person, MetalType::Gold, grams("2.0000"));
    let credit_id = *credit.id();
    let metal_account = MetalAccount::new(fixture.tenant, person, MetalType::Gold);
    let account_key = metal_account.id().0;
    fixture.backend.seed(|state| {
        state.metal_credits.insert(credit_id.0, credit);
        state.metal_accounts.insert(account_key, metal_account);
    });

    // 指令含现金腿 + 超额信用腿：整体失败，现金腿也不得落库
    let cmd = fixture.command(
        account_rec_id,
        vec![
            cash_leg("100.00", Some("300.00")),
            PaymentLeg::MetalCredit {
                metal_credit_id: credit_id,
                amount_in_grams: grams("3.0000"),
                quotation: Some(dec("300.00")),
            },
        ],
    );
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // 信用与应收均保持原状，无任何流水
    let credit_after = fixture
        .backend
        .read(|state| state.metal_credits[&credit_id.0].clone());
    assert_eq!(credit_after.grams().value(), dec("2.0000"));
    assert_eq!(credit_after.status(), MetalCreditStatus::Open);

    let receivable = fixture.receivable(account_rec_id);
    assert!(receivable.amount_paid().is_zero());
    assert!(fixture.backend.read(|state| state.transactions.is_empty()));
}

// ============================================================
// 信用转移腿场景
// ============================================================

#[tokio::test]
async fn test_credit_transfer_diverts_funds_without_paying_receivable() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let other_person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    let other_credit =
        MetalCredit::new(fixture.tenant, other_person, MetalType::Gold, grams("5.0000"));
    let other_credit_id = *other_credit.id();
    let other_account = MetalAccount::new(fixture.tenant, other_person, MetalType::Gold);
    let other_account_key = other_account.id().0;
    fixture.backend.seed(|state| {
        state.metal_credits.insert(other_credit_id.0, other_credit);
        state.metal_accounts.insert(other_account_key, other_account);
    });

    let cmd = fixture.command(
        account_rec_id,
        vec![PaymentLeg::CreditTransfer {
            target_metal_credit_id: other_credit_id,
            amount_in_grams: grams("2.0000"),
            quotation: dec("300.00"),
        }],
    );
    fixture.handler.execute(cmd).await.unwrap();

    // 转移不计入本应收的回款
    let receivable = fixture.receivable(account_rec_id);
    assert!(receivable.amount_paid().is_zero());
    assert!(receivable.gold_amount_paid().is_zero());

    let credit_after = fixture
        .backend
        .read(|state| state.metal_credits[&other_credit_id.0].clone());
    assert_eq!(credit_after.grams().value(), dec("3.0000"));
    assert_eq!(credit_after.status(), MetalCreditStatus::PartiallyPaid);

    // 借/贷配对流水互链
    let links: Vec<_> = fixture.backend.read(|state| {
        state
            .transactions
            .values()
            .map(|t| t.linked_transaction_id().copied())
            .collect()
    });
    assert_eq!(links.len(), 2);
    assert!(links.iter().all(|link| link.is_some()));
}

#[tokio::test]
async fn test_transfer_to_own_credit_rejected() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    let own_credit = MetalCredit::new(fixture.tenant, person, MetalType::Gold, grams("5.0000"));
    let own_credit_id = *own_credit.id();
    fixture.backend.seed(|state| {
        state.metal_credits.insert(own_credit_id.0, own_credit);
    });

    let cmd = fixture.command(
        account_rec_id,
        vec![PaymentLeg::CreditTransfer {
            target_metal_credit_id: own_credit_id,
            amount_in_grams: grams("1.0000"),
            quotation: dec("300.00"),
        }],
    );
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

// ============================================================
// 实物金属腿场景
// ============================================================

#[tokio::test]
async fn test_physical_metal_leg_creates_lot_and_counts_towards_payoff() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "3000.00", Some("10.0000"));

    let mut cmd = fixture.command(
        account_rec_id,
        vec![PaymentLeg::PhysicalMetal {
            metal_type: MetalType::Gold,
            amount_in_grams: grams("10.0000"),
            purity: dec("0.999"),
            quotation: Some(dec("300.00")),
        }],
    );
    cmd.finalize = true;
    fixture.handler.execute(cmd).await.unwrap();

    let receivable = fixture.receivable(account_rec_id);
    assert!(receivable.received());
    assert_eq!(receivable.gold_amount_paid().value(), dec("10.0000"));

    let lots: Vec<_> = fixture.backend.read(|state| state.pure_metal_lots.clone());
    assert_eq!(lots.len(), 1);
    assert_eq!(lots[0].initial_grams().value(), dec("10.0000"));
    assert_eq!(lots[0].purity(), dec("0.999"));
}

// ============================================================
// 前置校验场景
// ============================================================

#[tokio::test]
async fn test_settling_received_receivable_fails_without_writes() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    fixture.backend.seed(|state| {
        let receivable = state.receivables.get_mut(&account_rec_id.0).unwrap();
        receivable
            .register_payment(money("1000.00"), Grams::ZERO)
            .unwrap();
        receivable.mark_received(Utc::now());
    });

    let cmd = fixture.command(account_rec_id, vec![cash_leg("100.00", None)]);
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));

    assert!(fixture.backend.read(|state| state.transactions.is_empty()));
    let receivable = fixture.receivable(account_rec_id);
    assert_eq!(receivable.amount_paid().value(), dec("1000.00"));
}

#[tokio::test]
async fn test_unknown_receivable_is_not_found() {
    let fixture = Fixture::new(StaticQuotations::none());
    let cmd = fixture.command(AccountRecId::new(), vec![cash_leg("100.00", None)]);
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_receive_installment_payment_marks_targeted_installment_paid() {
    let fixture = Fixture::new(StaticQuotations::with_buy_price("300.00"));
    let person = PersonId::new();
    let (sale_id, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    let installment = SaleInstallment::new(
        fixture.tenant,
        sale_id,
        Some(account_rec_id),
        1,
        money("500.00"),
        Utc::now() + chrono::Duration::days(30),
    );
    let installment_id = *installment.id();
    fixture.backend.seed(|state| {
        state.installments.insert(installment_id.0, installment);
    });

    fixture
        .handler
        .receive_installment(ReceiveInstallmentCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            installment_id,
            payment: SinglePayment::Cash {
                current_account_id: CurrentAccountId::new(),
                amount: money("500.00"),
            },
            received_at: Utc::now(),
            quotation: None,
        })
        .await
        .unwrap();

    let installment_after = fixture
        .backend
        .read(|state| state.installments[&installment_id.0].clone());
    assert_eq!(installment_after.status(), SaleInstallmentStatus::Paid);
    assert!(installment_after.paid_at().is_some());

    // 半额收款：应收未收讫
    let receivable = fixture.receivable(account_rec_id);
    assert!(!receivable.received());
    assert_eq!(receivable.amount_paid().value(), dec("500.00"));
}

#[tokio::test]
async fn test_receive_installment_rejects_already_paid_installment() {
    let fixture = Fixture::new(StaticQuotations::with_buy_price("300.00"));
    let person = PersonId::new();
    let (sale_id, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    let mut installment = SaleInstallment::new(
        fixture.tenant,
        sale_id,
        Some(account_rec_id),
        1,
        money("500.00"),
        Utc::now(),
    );
    installment.mark_paid(Utc::now());
    let installment_id = *installment.id();
    fixture.backend.seed(|state| {
        state.installments.insert(installment_id.0, installment);
    });

    let err = fixture
        .handler
        .receive_installment(ReceiveInstallmentCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            installment_id,
            payment: SinglePayment::Cash {
                current_account_id: CurrentAccountId::new(),
                amount: money("500.00"),
            },
            received_at: Utc::now(),
            quotation: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));
}

#[tokio::test]
async fn test_targeted_installment_must_belong_to_receivable_sale() {
    let fixture = Fixture::new(StaticQuotations::none());
    let person = PersonId::new();
    let (_, account_rec_id) = fixture.seed_confirmed_sale(person, "1000.00", None);

    // 分期属于另一张销售单
    let foreign = SaleInstallment::new(
        fixture.tenant,
        SaleId::new(),
        None,
        1,
        money("500.00"),
        Utc::now(),
    );
    let foreign_id = *foreign.id();
    fixture.backend.seed(|state| {
        state.installments.insert(foreign_id.0, foreign);
    });

    let mut cmd = fixture.command(account_rec_id, vec![cash_leg("500.00", None)]);
    cmd.installment_id = Some(foreign_id);
    let err = fixture.handler.execute(cmd).await.unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));
}
