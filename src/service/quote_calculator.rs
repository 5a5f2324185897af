//! Turns the tasks of a quote and its financial settings into the amounts
//! shown to the client.
//!
//! Each derived amount is rounded to cents (half away from zero) before it is
//! reused, so `total_with_vat == total_before_vat + vat_amount` and
//! `balance_amount == total_with_vat - deposit_amount` hold exactly.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::model::financial_config::{AmountMode, FinancialSettings};
use crate::model::quote::{PricingType, QuoteMaterial, QuoteTask, QuoteTotals};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest quantity, price, duration or fixed amount accepted on a quote
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

#[derive(Debug, Error, PartialEq)]
pub enum CalculationError {
    #[error("Amount too large while computing {0}")]
    Overflow(&'static str),
}

pub type CalculationResult<T> = Result<T, CalculationError>;

fn mul(a: Decimal, b: Decimal, what: &'static str) -> CalculationResult<Decimal> {
    a.checked_mul(b).ok_or(CalculationError::Overflow(what))
}

fn add(a: Decimal, b: Decimal, what: &'static str) -> CalculationResult<Decimal> {
    a.checked_add(b).ok_or(CalculationError::Overflow(what))
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Labour price of a task, materials excluded. Hourly tasks without a
/// duration count as one hour.
pub fn task_price(task: &QuoteTask) -> CalculationResult<Decimal> {
    match task.pricing_type {
        PricingType::Flat => mul(task.unit_price, task.quantity, "task price"),
        PricingType::Hourly => {
            let hourly = mul(task.unit_price, task.duration.unwrap_or(Decimal::ONE), "task price")?;
            mul(hourly, task.quantity, "task price")
        }
    }
}

pub fn material_price(material: &QuoteMaterial) -> CalculationResult<Decimal> {
    mul(material.unit_price, material.quantity, "material price")
}

/// Labour plus materials of a single task
pub fn task_total(task: &QuoteTask) -> CalculationResult<Decimal> {
    task.materials.iter().try_fold(task_price(task)?, |acc, material| {
        add(acc, material_price(material)?, "task total")
    })
}

fn apply_mode(mode: AmountMode, value: Decimal, base: Decimal, what: &'static str) -> CalculationResult<Decimal> {
    match mode {
        AmountMode::Fixed => Ok(value),
        AmountMode::Percentage => Ok(mul(base, value, what)? / HUNDRED),
    }
}

pub fn calculate_quote_totals(
    tasks: &[QuoteTask],
    settings: Option<&FinancialSettings>,
) -> CalculationResult<QuoteTotals> {
    let subtotal = tasks
        .iter()
        .try_fold(Decimal::ZERO, |acc, task| add(acc, task_total(task)?, "subtotal"))?;
    let total_before_vat = round_money(subtotal);

    let Some(settings) = settings else {
        return Ok(QuoteTotals {
            total_before_vat,
            vat_amount: Decimal::ZERO,
            total_with_vat: total_before_vat,
            deposit_amount: Decimal::ZERO,
            balance_amount: total_before_vat,
            discount_amount: Decimal::ZERO,
        });
    };

    let vat_amount = if settings.vat.enabled {
        round_money(mul(total_before_vat, settings.vat.rate, "VAT")? / HUNDRED)
    } else {
        Decimal::ZERO
    };
    let total_with_vat = add(total_before_vat, vat_amount, "total with VAT")?;

    let deposit_amount = if settings.deposit.enabled {
        round_money(apply_mode(settings.deposit.mode, settings.deposit.value, total_with_vat, "deposit")?)
    } else {
        Decimal::ZERO
    };

    // The discount is an offer on the full amount; it does not lower the balance.
    let discount_amount = if settings.discount.enabled {
        round_money(apply_mode(settings.discount.mode, settings.discount.value, total_with_vat, "discount")?)
    } else {
        Decimal::ZERO
    };

    Ok(QuoteTotals {
        total_before_vat,
        vat_amount,
        total_with_vat,
        deposit_amount,
        balance_amount: total_with_vat - deposit_amount,
        discount_amount,
    })
}

/// Rejects settings the calculator would turn into nonsense amounts
pub fn validate_settings(settings: &FinancialSettings) -> Result<(), String> {
    let vat = &settings.vat;
    if vat.rate < Decimal::ZERO || vat.rate > HUNDRED {
        return Err(format!("VAT rate must be between 0 and 100, got {}", vat.rate));
    }
    for (name, mode, value) in [
        ("deposit", settings.deposit.mode, settings.deposit.value),
        ("discount", settings.discount.mode, settings.discount.value),
    ] {
        if value < Decimal::ZERO {
            return Err(format!("{} value must not be negative", name));
        }
        if value > MAX_AMOUNT {
            return Err(format!("{} value must not exceed {}", name, MAX_AMOUNT));
        }
        if mode == AmountMode::Percentage && value > HUNDRED {
            return Err(format!("{} percentage must not exceed 100", name));
        }
    }
    Ok(())
}
