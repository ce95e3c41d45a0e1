//! 期望产出计算器
//!
//! 给定销售行项目、产品核算方法与实际收款报价，计算整单期望克重、
//! 工费克重与成本合计。纯函数，无副作用。

use std::collections::HashMap;

use aurum_domain_core::{Grams, Money};
use rust_decimal::Decimal;

use crate::domain::entities::{LaborCostBracket, Product, SaleItem, lookup_labor_grams};
use crate::domain::enums::SaleAdjustmentCalcMethod;
use crate::domain::value_objects::ProductId;

/// 期望产出
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedYield {
    /// 期望克重（行项目口径，不含工费）
    pub expected_grams: Grams,
    /// 工费克重
    pub labor_grams: Grams,
    /// 成本合计（BRL，按实际收款报价折算）
    pub total_cost_brl: Money,
}

/// 计算整单期望产出
///
/// - QuantityBased：期望克重 = 数量 × 单件含金量；
/// - CostBased：期望克重 = 销售时成本 × 数量 ÷ 报价，报价不可用时该行贡献为零；
/// - 行项目声明工费比例时按行累计工费克重，否则整单查一次工费表。
pub fn calculate(
    items: &[SaleItem],
    products: &HashMap<ProductId, Product>,
    payment_quotation: Decimal,
    labor_brackets: &[LaborCostBracket],
) -> ExpectedYield {
    let mut expected_grams = Grams::ZERO;
    let mut labor_grams = Grams::ZERO;
    let mut total_cost_brl = Money::ZERO;
    let mut any_item_labor = false;

    for item in items {
        let Some(product) = products.get(item.product_id()) else {
            continue;
        };

        let quantity = Decimal::from(item.quantity());
        let item_grams = match product.calc_method() {
            SaleAdjustmentCalcMethod::QuantityBased => {
                Grams::new(quantity * product.gold_value_per_unit().value())
            }
            SaleAdjustmentCalcMethod::CostBased => {
                let item_cost = Money::new(item.cost_price_at_sale().value() * quantity);
                match item_cost.to_grams(payment_quotation) {
                    Some(grams) => grams,
                    None => Grams::ZERO,
                }
            }
        };

        if let Some(percentage) = item.labor_percentage() {
            any_item_labor = true;
            labor_grams += Grams::new(item_grams.value() * percentage / Decimal::ONE_HUNDRED);
        }

        expected_grams += item_grams;
        total_cost_brl += item_grams.value_at(payment_quotation);
    }

    // 没有任何行项目声明工费比例时，整单回退工费表（只查一次）
    if !any_item_labor {
        labor_grams = lookup_labor_grams(labor_brackets, expected_grams);
    }

    ExpectedYield {
        expected_grams,
        labor_grams,
        total_cost_brl,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum_common::TenantId;
    use aurum_domain_core::Entity;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn quantity_product(tenant: TenantId, gold_per_unit: &str) -> Product {
        Product::new(
            tenant,
            "Sal de ouro 68%",
            Grams::new(dec(gold_per_unit)),
            SaleAdjustmentCalcMethod::QuantityBased,
        )
    }

    fn cost_product(tenant: TenantId) -> Product {
        Product::new(
            tenant,
            "Banho de ródio",
            Grams::ZERO,
            SaleAdjustmentCalcMethod::CostBased,
        )
    }

    #[test]
    fn test_mixed_policies_accumulate_expected_grams() {
        let tenant = TenantId::new();
        // 数量法：5 × 2.0000g = 10g；成本法：150.00 × 2 ÷ 300.00 = 1g
        let p1 = quantity_product(tenant, "2.0000");
        let p2 = cost_product(tenant);
        let items = vec![
            SaleItem::new(*p1.id(), 5, Money::new(dec("500.00")), Money::new(dec("400.00")), None),
            SaleItem::new(*p2.id(), 2, Money::new(dec("200.00")), Money::new(dec("150.00")), None),
        ];
        let products: HashMap<_, _> = [p1, p2]
            .into_iter()
            .map(|p| (*p.id(), p))
            .collect();

        let yield_ = calculate(&items, &products, dec("300.00"), &[]);
        assert_eq!(yield_.expected_grams.value(), dec("11.0000"));
        // 成本合计 = 300 × 11g
        assert_eq!(yield_.total_cost_brl.value(), dec("3300.0000"));
    }

    #[test]
    fn test_cost_based_item_skipped_without_quotation() {
        let tenant = TenantId::new();
        let p = cost_product(tenant);
        let items = vec![SaleItem::new(
            *p.id(),
            2,
            Money::new(dec("200.00")),
            Money::new(dec("150.00")),
            None,
        )];
        let products: HashMap<_, _> =
            [(*p.id(), p)].into_iter().collect();

        let yield_ = calculate(&items, &products, Decimal::ZERO, &[]);
        assert!(yield_.expected_grams.is_zero());
        assert!(yield_.total_cost_brl.is_zero());
    }

    #[test]
    fn test_item_labor_percentage_overrides_table() {
        let tenant = TenantId::new();
        let p = quantity_product(tenant, "2.0000");
        let items = vec![SaleItem::new(
            *p.id(),
            5,
            Money::new(dec("500.00")),
            Money::new(dec("400.00")),
            Some(dec("10")),
        )];
        let products: HashMap<_, _> =
            [(*p.id(), p)].into_iter().collect();
        // 工费表即使存在也不应被使用
        let brackets = vec![LaborCostBracket::new(
            tenant,
            Grams::ZERO,
            None,
            Grams::new(dec("9.0000")),
        )];

        let yield_ = calculate(&items, &products, dec("300.00"), &brackets);
        // 10g × 10% = 1g
        assert_eq!(yield_.labor_grams.value(), dec("1.0000"));
    }

    #[test]
    fn test_labor_table_fallback_consulted_once_for_whole_sale() {
        let tenant = TenantId::new();
        let p = quantity_product(tenant, "3.0000");
        let items = vec![
            SaleItem::new(*p.id(), 1, Money::new(dec("100.00")), Money::new(dec("80.00")), None),
            SaleItem::new(*p.id(), 1, Money::new(dec("100.00")), Money::new(dec("80.00")), None),
        ];
        let products: HashMap<_, _> =
            [(*p.id(), p)].into_iter().collect();
        let brackets = vec![
            LaborCostBracket::new(
                tenant,
                Grams::ZERO,
                Some(Grams::new(dec("5"))),
                Grams::new(dec("0.2000")),
            ),
            LaborCostBracket::new(
                tenant,
                Grams::new(dec("5.0001")),
                None,
                Grams::new(dec("0.5000")),
            ),
        ];

        // 整单 6g 落在第二个区间，收 0.5g；而不是每行 3g 各收 0.2g
        let yield_ = calculate(&items, &products, dec("300.00"), &brackets);
        assert_eq!(yield_.labor_grams.value(), dec("0.5000"));
    }
}
