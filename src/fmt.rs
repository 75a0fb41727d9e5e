use rust_decimal::Decimal;

use crate::models::TransactionKind;

/// Format an amount the way the bank prints it: `1.234,56`.
pub fn money(val: Decimal) -> String {
    let negative = val.is_sign_negative() && !val.is_zero();
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{grouped},{dec_part}")
    } else {
        format!("{grouped},{dec_part}")
    }
}

/// Signed view of an amount: expenses print with a leading minus.
pub fn signed_money(val: Decimal, kind: TransactionKind) -> String {
    match kind {
        TransactionKind::Income => money(val),
        TransactionKind::Expense => money(-val),
    }
}
