//! 订单价格计算（纯函数, 金额单位: 分）

use crate::models::{CartItem, PriceBreakdown};

/// 固定配送费 30.00
pub const DELIVERY_FEE: i64 = 3000;
/// 满 200.00 减 100.00
pub const DISCOUNT_THRESHOLD: i64 = 20000;
pub const DISCOUNT_AMOUNT: i64 = 10000;
/// 税率 5%
pub const TAX_PERCENT: i64 = 5;

pub fn subtotal(items: &[CartItem]) -> i64 {
    items
        .iter()
        .map(|item| item.price * i64::from(item.quantity))
        .sum()
}

/// 空购物车不收配送费
pub fn delivery_fee(items: &[CartItem]) -> i64 {
    if items.is_empty() { 0 } else { DELIVERY_FEE }
}

/// subtotal * 5%, 四舍五入到分
pub fn tax(subtotal: i64) -> i64 {
    (subtotal * TAX_PERCENT + 50) / 100
}

pub fn discount(subtotal: i64) -> i64 {
    if subtotal >= DISCOUNT_THRESHOLD {
        DISCOUNT_AMOUNT
    } else {
        0
    }
}

pub fn calculate(items: &[CartItem]) -> PriceBreakdown {
    let subtotal = subtotal(items);
    let delivery_fee = delivery_fee(items);
    let tax = tax(subtotal);
    let discount = discount(subtotal);
    let total = (subtotal + delivery_fee + tax - discount).max(0);

    PriceBreakdown {
        subtotal,
        delivery_fee,
        tax,
        discount,
        total,
    }
}

/// 下单奖励积分: floor(金额 × 10), 金额以元计
pub fn order_points(amount_cents: i64) -> i64 {
    amount_cents.max(0) / 10
}
