//! 销售单生命周期测试

mod support;

use std::sync::Arc;

use aurum_common::{TenantId, UserId};
use aurum_domain_core::Entity;
use aurum_errors::AppError;
use chrono::Utc;

use fi_ar::application::commands::{ConfirmSaleCommand, HybridSettlementCommand, InstallmentPlan, PaymentLeg};
use fi_ar::application::{SaleLifecycleHandler, SettlementHandler};
use fi_ar::domain::entities::{Product, Sale, SaleItem};
use fi_ar::domain::enums::{
    PaymentMethod, SaleAdjustmentCalcMethod, SaleInstallmentStatus, SaleStatus,
    TransactionStatus, TransactionType,
};
use fi_ar::domain::value_objects::{CurrentAccountId, PersonId, SaleId};

use support::{
    InMemoryBackend, InMemoryUowFactory, StaticQuotations, StaticSettings, dec, grams, money,
};

struct Fixture {
    backend: InMemoryBackend,
    lifecycle: SaleLifecycleHandler,
    settlement: SettlementHandler,
    tenant: TenantId,
}

impl Fixture {
    fn new() -> Self {
        let backend = InMemoryBackend::new();
        let factory = Arc::new(InMemoryUowFactory::new(backend.clone()));
        let settings = Arc::new(StaticSettings::configured());
        let lifecycle = SaleLifecycleHandler::new(factory.clone(), settings.clone());
        let settlement = SettlementHandler::new(
            factory,
            Arc::new(StaticQuotations::with_buy_price("300.00")),
            settings,
        );
        Self {
            backend,
            lifecycle,
            settlement,
            tenant: TenantId::new(),
        }
    }

    fn seed_pending_sale(&self, person: PersonId, payment_method: PaymentMethod) -> SaleId {
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
        let sale = Sale::new(
            self.tenant,
            3001,
            person,
            payment_method,
            dec("300.00"),
            money("3000.00"),
            money("3000.00"),
            grams("10.0000"),
            items,
        );
        let sale_id = *sale.id();
        let product_key = product.id().0;
        self.backend.seed(|state| {
            state.products.insert(product_key, product);
            state.sales.insert(sale_id.0, sale);
        });
        sale_id
    }

    fn sale(&self, id: SaleId) -> Sale {
        self.backend
            .read(|state| state.sales.get(&id.0).cloned())
            .unwrap()
    }
}

#[tokio::test]
async fn test_confirm_creates_receivable_and_installments() {
    let fixture = Fixture::new();
    let person = PersonId::new();
    let sale_id = fixture.seed_pending_sale(person, PaymentMethod::Installments);

    fixture
        .lifecycle
        .confirm_sale(ConfirmSaleCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            sale_id,
            payment_method: PaymentMethod::Installments,
            current_account_id: None,
            installment_plan: Some(InstallmentPlan {
                count: 3,
                first_due_date: Utc::now() + chrono::Duration::days(30),
            }),
            updated_gold_price: None,
        })
        .await
        .unwrap();

    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Confirmed);

    let (receivables, installments) = fixture.backend.read(|state| {
        (
            state.receivables.len(),
            state.installments.values().cloned().collect::<Vec<_>>(),
        )
    });
    assert_eq!(receivables, 1);
    assert_eq!(installments.len(), 3);
    assert!(
        installments
            .iter()
            .all(|i| i.status() == SaleInstallmentStatus::Pending)
    );
    // 等额分期
    assert!(
        installments
            .iter()
            .all(|i| i.amount().value() == dec("1000.00"))
    );
}

#[tokio::test]
async fn test_cash_upfront_confirm_records_immediate_transaction() {
    let fixture = Fixture::new();
    let person = PersonId::new();
    let sale_id = fixture.seed_pending_sale(person, PaymentMethod::CashUpfront);

    fixture
        .lifecycle
        .confirm_sale(ConfirmSaleCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            sale_id,
            payment_method: PaymentMethod::CashUpfront,
            current_account_id: Some(CurrentAccountId::new()),
            installment_plan: None,
            updated_gold_price: None,
        })
        .await
        .unwrap();

    let transactions: Vec<_> = fixture
        .backend
        .read(|state| state.transactions.values().cloned().collect());
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].transaction_type(), TransactionType::Credit);
    assert_eq!(transactions[0].amount().value(), dec("3000.00"));
}

#[tokio::test]
async fn test_metal_sale_finalization_creates_gold_denominated_receivable() {
    let fixture = Fixture::new();
    let person = PersonId::new();
    let sale_id = fixture.seed_pending_sale(person, PaymentMethod::Metal);

    fixture
        .lifecycle
        .confirm_sale(ConfirmSaleCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            sale_id,
            payment_method: PaymentMethod::Metal,
            current_account_id: None,
            installment_plan: None,
            updated_gold_price: None,
        })
        .await
        .unwrap();

    fixture
        .lifecycle
        .finalize_sale(&fixture.tenant, &sale_id)
        .await
        .unwrap();

    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Finalized);

    let receivable = fixture
        .backend
        .read(|state| state.receivables.values().next().cloned())
        .unwrap();
    assert!(receivable.is_gold_denominated());
    assert_eq!(receivable.gold_amount().unwrap().value(), dec("10.0000"));
}

#[tokio::test]
async fn test_revert_rolls_back_settlement_state() {
    let fixture = Fixture::new();
    let person = PersonId::new();
    let sale_id = fixture.seed_pending_sale(person, PaymentMethod::Installments);

    fixture
        .lifecycle
        .confirm_sale(ConfirmSaleCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            sale_id,
            payment_method: PaymentMethod::Installments,
            current_account_id: None,
            installment_plan: Some(InstallmentPlan {
                count: 2,
                first_due_date: Utc::now() + chrono::Duration::days(30),
            }),
            updated_gold_price: None,
        })
        .await
        .unwrap();

    let account_rec_id = fixture
        .backend
        .read(|state| state.receivables.values().next().map(|ar| *ar.id()))
        .unwrap();

    // 部分收款后冲销
    fixture
        .settlement
        .execute(HybridSettlementCommand {
            tenant_id: fixture.tenant,
            user_id: UserId::new(),
            account_rec_id,
            legs: vec![PaymentLeg::Cash {
                current_account_id: CurrentAccountId::new(),
                amount: money("1500.00"),
                received_at: None,
                quotation: None,
            }],
            received_at: Utc::now(),
            quotation: None,
            finalize: false,
            installment_id: None,
        })
        .await
        .unwrap();

    fixture
        .lifecycle
        .revert_sale(&fixture.tenant, &sale_id)
        .await
        .unwrap();

    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Pending);

    let receivable = fixture
        .backend
        .read(|state| state.receivables.get(&account_rec_id.0).cloned())
        .unwrap();
    assert!(!receivable.received());
    assert!(receivable.amount_paid().is_zero());
    assert!(receivable.gold_amount_paid().is_zero());

    let installments_pending = fixture.backend.read(|state| {
        state
            .installments
            .values()
            .all(|i| i.status() == SaleInstallmentStatus::Pending && i.amount_paid().is_zero())
    });
    assert!(installments_pending);

    // 原收款流水与反向流水全部标记 Adjusted
    let transactions: Vec<_> = fixture
        .backend
        .read(|state| state.transactions.values().cloned().collect());
    assert_eq!(transactions.len(), 2);
    assert!(
        transactions
            .iter()
            .all(|t| t.status() == TransactionStatus::Adjusted)
    );
    assert!(
        transactions
            .iter()
            .any(|t| t.transaction_type() == TransactionType::Debit)
    );
}

#[tokio::test]
async fn test_finalized_sale_cannot_be_cancelled() {
    let fixture = Fixture::new();
    let person = PersonId::new();
    let sale_id = fixture.seed_pending_sale(person, PaymentMethod::Installments);

    fixture.backend.seed(|state| {
        let sale = state.sales.get_mut(&sale_id.0).unwrap();
        sale.confirm().unwrap();
        sale.finalize().unwrap();
    });

    let err = fixture
        .lifecycle
        .cancel_sale(&fixture.tenant, &sale_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::FailedPrecondition(_)));
    assert_eq!(fixture.sale(sale_id).status(), SaleStatus::Finalized);
}
