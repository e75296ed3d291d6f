use rust_decimal::Decimal;
use serde::Serialize;

use super::classify::TaxSummary;
use super::us::{
    Bracket, ADDITIONAL_MEDICARE_RATE, C_CORP_RATE, EMPLOYER_PAYROLL_RATE, MEDICARE_RATE,
    SE_NET_EARNINGS_FACTOR, SOCIAL_SECURITY_RATE, SOCIAL_SECURITY_WAGE_BASE,
};
use crate::core::{EntityType, FilingStatus, TaxProfile};

/// Self-employment tax components
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfEmploymentTax {
    pub net_earnings: Decimal,
    pub social_security: Decimal,
    pub medicare: Decimal,
    pub additional_medicare: Decimal,
    pub total: Decimal,
    /// Half of the total, deducted before federal brackets
    pub half_deduction: Decimal,
}

/// Estimated taxes for one filing window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxEstimate {
    pub taxable_profit: Decimal,
    pub standard_deduction: Decimal,
    pub self_employment: SelfEmploymentTax,
    /// Income the federal brackets were applied to
    pub federal_taxable_income: Decimal,
    pub federal: Decimal,
    pub state: Decimal,
    pub total: Decimal,
    /// Informational, not part of `total`
    pub payroll_employer: Decimal,
    /// Informational, not part of `total`
    pub sales_tax_liability: Decimal,
}

/// Tax on `income` under ascending marginal `brackets`
pub fn progressive_tax(income: Decimal, brackets: &[Bracket]) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;
    for bracket in brackets {
        if income <= lower {
            break;
        }
        let upper = bracket.upper.map_or(income, |u| u.min(income));
        if upper > lower {
            tax += (upper - lower) * bracket.rate;
        }
        match bracket.upper {
            Some(u) => lower = u,
            None => break,
        }
    }
    tax
}

/// Self-employment tax on a taxable profit
pub fn self_employment_tax(profit: Decimal, status: FilingStatus) -> SelfEmploymentTax {
    let net_earnings = profit.max(Decimal::ZERO) * SE_NET_EARNINGS_FACTOR;
    let social_security = net_earnings.min(SOCIAL_SECURITY_WAGE_BASE) * SOCIAL_SECURITY_RATE;
    let medicare = net_earnings * MEDICARE_RATE;
    let additional_medicare = (net_earnings - status.additional_medicare_threshold())
        .max(Decimal::ZERO)
        * ADDITIONAL_MEDICARE_RATE;
    let total = social_security + medicare + additional_medicare;
    SelfEmploymentTax {
        net_earnings,
        social_security,
        medicare,
        additional_medicare,
        total,
        half_deduction: total / Decimal::TWO,
    }
}

/// Estimate federal, state and self-employment tax from a tax summary
pub fn estimate_tax(summary: &TaxSummary, profile: &TaxProfile) -> TaxEstimate {
    let taxable_profit = summary.taxable_profit();
    let c_corp = profile.entity_type == EntityType::CCorp;

    let standard_deduction = if c_corp {
        Decimal::ZERO
    } else {
        profile.filing_status.standard_deduction()
    };

    let self_employment =
        if profile.include_self_employment && profile.entity_type.pays_self_employment_tax() {
            self_employment_tax(taxable_profit, profile.filing_status)
        } else {
            SelfEmploymentTax::default()
        };

    let (federal_taxable_income, federal) = if c_corp {
        (taxable_profit, taxable_profit * C_CORP_RATE)
    } else {
        let income = (taxable_profit - standard_deduction - self_employment.half_deduction)
            .max(Decimal::ZERO);
        (income, progressive_tax(income, profile.filing_status.brackets()))
    };

    let state = taxable_profit * profile.clamped_state_rate();
    let total = federal
        .saturating_add(state)
        .saturating_add(self_employment.total);

    let payroll_employer = if profile.has_payroll {
        summary.payroll_expenses * EMPLOYER_PAYROLL_RATE
    } else {
        Decimal::ZERO
    };

    log::debug!(
        "Tax estimate ({:?}/{:?}): profit {} federal {} state {} SE {}",
        profile.entity_type,
        profile.filing_status,
        taxable_profit,
        federal,
        state,
        self_employment.total
    );

    TaxEstimate {
        taxable_profit,
        standard_deduction,
        self_employment,
        federal_taxable_income,
        federal,
        state,
        total,
        payroll_employer,
        sales_tax_liability: summary.sales_tax_collected,
    }
}
