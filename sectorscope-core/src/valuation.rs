//! Valuation recipes over already-tabulated inputs.
//!
//! All rates are decimals (0.08 = 8%). A zero denominator is an
//! `InvalidParameter` error rather than an infinite result.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::stats::round_to;

/// Growth from `first` to `last`, rounded to three places.
pub fn simple_growth(first: f64, last: f64) -> Result<f64, AnalysisError> {
    if first == 0.0 {
        return Err(AnalysisError::invalid_parameter("growth base is zero"));
    }
    Ok(round_to(last / first - 1.0, 3))
}

/// Compound annual growth rate over `years`.
pub fn cagr(first: f64, last: f64, years: f64) -> Result<f64, AnalysisError> {
    if first == 0.0 {
        return Err(AnalysisError::invalid_parameter("growth base is zero"));
    }
    if years <= 0.0 || !years.is_finite() {
        return Err(AnalysisError::invalid_parameter("years must be positive"));
    }
    let ratio = last / first;
    if ratio < 0.0 {
        return Err(AnalysisError::invalid_parameter(
            "start and end values differ in sign",
        ));
    }
    Ok(ratio.powf(1.0 / years) - 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapitalStructure {
    /// Market value of equity.
    pub equity: f64,
    /// Market value of debt.
    pub debt: f64,
    pub cost_of_equity: f64,
    /// Pre-tax cost of debt.
    pub cost_of_debt: f64,
    pub tax_rate: f64,
}

/// Weighted average cost of capital.
pub fn wacc(cs: &CapitalStructure) -> Result<f64, AnalysisError> {
    let total = cs.equity + cs.debt;
    if total == 0.0 {
        return Err(AnalysisError::invalid_parameter("equity plus debt is zero"));
    }
    Ok(cs.equity / total * cs.cost_of_equity
        + cs.debt / total * cs.cost_of_debt * (1.0 - cs.tax_rate))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfInputs {
    /// Base-year free cash flow.
    pub base_cash_flow: f64,
    /// Annual growth applied to each projected year.
    pub growth_rates: Vec<f64>,
    /// Perpetual growth after the projection.
    pub terminal_growth: f64,
    pub discount_rate: f64,
    pub net_debt: f64,
    pub shares_outstanding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub cash_flows: Vec<f64>,
    pub present_values: Vec<f64>,
    /// Gordon-growth value at the end of the projection, undiscounted.
    pub terminal_value: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub per_share: f64,
}

/// Project cash flows, discount them, and add a Gordon-growth terminal value.
pub fn discounted_cash_flow(inputs: &DcfInputs) -> Result<DcfValuation, AnalysisError> {
    if inputs.growth_rates.is_empty() {
        return Err(AnalysisError::invalid_parameter(
            "at least one projected year is required",
        ));
    }
    if inputs.discount_rate == inputs.terminal_growth {
        return Err(AnalysisError::invalid_parameter(
            "discount rate equals terminal growth",
        ));
    }
    if inputs.discount_rate <= -1.0 {
        return Err(AnalysisError::invalid_parameter(
            "discount rate must exceed -100%",
        ));
    }
    if inputs.shares_outstanding == 0.0 {
        return Err(AnalysisError::invalid_parameter("shares outstanding is zero"));
    }

    let mut cash_flows = Vec::with_capacity(inputs.growth_rates.len());
    let mut cf = inputs.base_cash_flow;
    for g in &inputs.growth_rates {
        cf *= 1.0 + g;
        cash_flows.push(cf);
    }

    let discount = |year: usize| (1.0 + inputs.discount_rate).powi(year as i32);
    let present_values: Vec<f64> = cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / discount(i + 1))
        .collect();

    let years = cash_flows.len();
    let terminal_value = cf * (1.0 + inputs.terminal_growth)
        / (inputs.discount_rate - inputs.terminal_growth);
    let enterprise_value = present_values.iter().sum::<f64>() + terminal_value / discount(years);
    let equity_value = enterprise_value - inputs.net_debt;

    Ok(DcfValuation {
        cash_flows,
        present_values,
        terminal_value,
        enterprise_value,
        equity_value,
        per_share: equity_value / inputs.shares_outstanding,
    })
}
