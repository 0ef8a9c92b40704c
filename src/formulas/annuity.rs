//! Ordinary annuities: fixed payments at the end of each period

use super::format::{amount, money, percent};
use super::{finite, CalculationResult, FormulaId};
use crate::error::PlannerError;
use crate::Result;

/// FV = pmt * ((1 + r)^n - 1) / r, or pmt * n when r = 0
pub fn fv_annuity(pmt: f64, r: f64, n: f64) -> Result<CalculationResult> {
    let value = if r == 0.0 {
        pmt * n
    } else {
        pmt * (((1.0 + r).powf(n) - 1.0) / r)
    };
    let value = finite(FormulaId::FvAnnuity, value)?;

    Ok(CalculationResult::new(
        FormulaId::FvAnnuity,
        value,
        render("Future Value of Annuity", value, pmt, r, n),
        &[("pmt", pmt), ("r", r), ("n", n)],
    ))
}

/// PV = pmt * (1 - (1 + r)^-n) / r, or pmt * n when r = 0
pub fn pv_annuity(pmt: f64, r: f64, n: f64) -> Result<CalculationResult> {
    let value = if r == 0.0 {
        pmt * n
    } else {
        let base = 1.0 + r;
        if base == 0.0 {
            return Err(PlannerError::DomainError(
                "pv_annuity raises 1 + r = 0 to a negative power".to_string(),
            ));
        }
        pmt * (1.0 - base.powf(-n)) / r
    };
    let value = finite(FormulaId::PvAnnuity, value)?;

    Ok(CalculationResult::new(
        FormulaId::PvAnnuity,
        value,
        render("Present Value of Annuity", value, pmt, r, n),
        &[("pmt", pmt), ("r", r), ("n", n)],
    ))
}

fn render(label: &str, value: f64, pmt: f64, r: f64, n: f64) -> String {
    format!(
        "{}: ${} (Payment: ${}, Rate: {}%, Periods: {})",
        label,
        money(value),
        amount(pmt),
        percent(r),
        amount(n)
    )
}
