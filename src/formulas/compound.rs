//! Lump-sum compound interest: growth, discounting, doubling time, periods

use super::format::{amount, money, percent};
use super::{finite, CalculationResult, FormulaId};
use crate::error::PlannerError;
use crate::Result;

/// FV = pv * (1 + r)^n
///
/// Negative `pv` is allowed and models a withdrawal.
pub fn future_value(pv: f64, r: f64, n: f64) -> Result<CalculationResult> {
    let growth = (1.0 + r).powf(n);
    let value = finite(FormulaId::FutureValue, pv * growth)?;

    let text = format!(
        "Future Value: ${} (Principal: ${}, Rate: {}%, Periods: {})",
        money(value),
        amount(pv),
        percent(r),
        amount(n)
    );

    Ok(CalculationResult::new(
        FormulaId::FutureValue,
        value,
        text,
        &[("pv", pv), ("r", r), ("n", n)],
    ))
}

/// PV = fv / (1 + r)^n
pub fn present_value(fv: f64, r: f64, n: f64) -> Result<CalculationResult> {
    let discount = (1.0 + r).powf(n);
    // r = -1 gives 0 for n > 0 and inf for n < 0; both leave fv undiscountable
    if discount == 0.0 || !discount.is_finite() {
        return Err(PlannerError::DomainError(format!(
            "present_value cannot discount by (1 + r)^n = {} (r = {}, n = {})",
            discount, r, n
        )));
    }
    let value = finite(FormulaId::PresentValue, fv / discount)?;

    let text = format!(
        "Present Value: ${} (Future Value: ${}, Rate: {}%, Periods: {})",
        money(value),
        amount(fv),
        percent(r),
        amount(n)
    );

    Ok(CalculationResult::new(
        FormulaId::PresentValue,
        value,
        text,
        &[("fv", fv), ("r", r), ("n", n)],
    ))
}

/// years = 72 / (r * 100)
pub fn rule_of_72(r: f64) -> Result<CalculationResult> {
    let pct = r * 100.0;
    if pct == 0.0 {
        return Err(PlannerError::DomainError(
            "rule_of_72 divides by zero when r = 0".to_string(),
        ));
    }
    let years = finite(FormulaId::RuleOf72, 72.0 / pct)?;

    let text = format!(
        "Rule of 72: Investment will double in approximately {:.1} years at {}% interest",
        years,
        percent(r)
    );

    Ok(CalculationResult::new(FormulaId::RuleOf72, years, text, &[("r", r)]))
}

/// Number of periods for `pv` to reach `fv`, optionally with a per-period payment.
///
/// - `pmt == 0`: ln(fv / pv) / ln(1 + r)
/// - `r == 0`: (fv - pv) / pmt
/// - otherwise: ln((fv * r + pmt) / (pv * r + pmt)) / ln(1 + r)
pub fn nper(pv: f64, fv: f64, r: f64, pmt: f64) -> Result<CalculationResult> {
    let periods = if pmt == 0.0 {
        if pv == 0.0 {
            return Err(PlannerError::DomainError(
                "nper divides by pv = 0".to_string(),
            ));
        }
        let ratio = fv / pv;
        if ratio <= 0.0 {
            return Err(PlannerError::DomainError(format!(
                "nper needs fv / pv > 0, got {}",
                ratio
            )));
        }
        ratio.ln() / growth_log(r)?
    } else if r == 0.0 {
        (fv - pv) / pmt
    } else {
        let denominator = pv * r + pmt;
        if denominator == 0.0 {
            return Err(PlannerError::DomainError(
                "nper divides by pv * r + pmt = 0".to_string(),
            ));
        }
        let ratio = (fv * r + pmt) / denominator;
        if ratio <= 0.0 {
            return Err(PlannerError::DomainError(format!(
                "nper needs (fv * r + pmt) / (pv * r + pmt) > 0, got {}",
                ratio
            )));
        }
        ratio.ln() / growth_log(r)?
    };
    let periods = finite(FormulaId::Nper, periods)?;

    let text = format!(
        "Number of Periods: {:.2} (PV: ${}, FV: ${}, Rate: {}%, Payment: ${})",
        periods,
        amount(pv),
        amount(fv),
        percent(r),
        amount(pmt)
    );

    Ok(CalculationResult::new(
        FormulaId::Nper,
        periods,
        text,
        &[("pv", pv), ("fv", fv), ("r", r), ("pmt", pmt)],
    ))
}

/// ln(1 + r), rejecting the cases where it is undefined or zero.
fn growth_log(r: f64) -> Result<f64> {
    let base = 1.0 + r;
    if base <= 0.0 {
        return Err(PlannerError::DomainError(format!(
            "nper needs 1 + r > 0, got {}",
            base
        )));
    }
    let log = base.ln();
    if log == 0.0 {
        return Err(PlannerError::DomainError(
            "nper divides by ln(1 + r) = 0".to_string(),
        ));
    }
    Ok(log)
}
