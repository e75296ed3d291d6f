//! US federal tables for tax year 2024.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::FilingStatus;

/// Share of profit treated as net earnings from self-employment
pub const SE_NET_EARNINGS_FACTOR: Decimal = dec!(0.9235);
/// Social Security wage base
pub const SOCIAL_SECURITY_WAGE_BASE: Decimal = dec!(168600);
pub const SOCIAL_SECURITY_RATE: Decimal = dec!(0.124);
pub const MEDICARE_RATE: Decimal = dec!(0.029);
pub const ADDITIONAL_MEDICARE_RATE: Decimal = dec!(0.009);
pub const C_CORP_RATE: Decimal = dec!(0.21);
/// Employer share of Social Security and Medicare on wages
pub const EMPLOYER_PAYROLL_RATE: Decimal = dec!(0.0765);

/// A marginal band; `upper` is `None` for the top band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bracket {
    pub upper: Option<Decimal>,
    pub rate: Decimal,
}

const fn band(upper: Decimal, rate: Decimal) -> Bracket {
    Bracket {
        upper: Some(upper),
        rate,
    }
}

const TOP: Bracket = Bracket {
    upper: None,
    rate: dec!(0.37),
};

const SINGLE: [Bracket; 7] = [
    band(dec!(11600), dec!(0.10)),
    band(dec!(47150), dec!(0.12)),
    band(dec!(100525), dec!(0.22)),
    band(dec!(191950), dec!(0.24)),
    band(dec!(243725), dec!(0.32)),
    band(dec!(609350), dec!(0.35)),
    TOP,
];

const MARRIED_JOINT: [Bracket; 7] = [
    band(dec!(23200), dec!(0.10)),
    band(dec!(94300), dec!(0.12)),
    band(dec!(201050), dec!(0.22)),
    band(dec!(383900), dec!(0.24)),
    band(dec!(487450), dec!(0.32)),
    band(dec!(731200), dec!(0.35)),
    TOP,
];

const MARRIED_SEPARATE: [Bracket; 7] = [
    band(dec!(11600), dec!(0.10)),
    band(dec!(47150), dec!(0.12)),
    band(dec!(100525), dec!(0.22)),
    band(dec!(191950), dec!(0.24)),
    band(dec!(243725), dec!(0.32)),
    band(dec!(365600), dec!(0.35)),
    TOP,
];

const HEAD_OF_HOUSEHOLD: [Bracket; 7] = [
    band(dec!(16550), dec!(0.10)),
    band(dec!(63100), dec!(0.12)),
    band(dec!(100500), dec!(0.22)),
    band(dec!(191950), dec!(0.24)),
    band(dec!(243700), dec!(0.32)),
    band(dec!(609350), dec!(0.35)),
    TOP,
];

impl FilingStatus {
    pub fn standard_deduction(self) -> Decimal {
        match self {
            FilingStatus::Single | FilingStatus::MarriedSeparate => dec!(14600),
            FilingStatus::HeadOfHousehold => dec!(21900),
            FilingStatus::MarriedJoint => dec!(29200),
        }
    }

    /// Marginal bands in ascending order
    pub fn brackets(self) -> &'static [Bracket] {
        match self {
            FilingStatus::Single => &SINGLE,
            FilingStatus::MarriedJoint => &MARRIED_JOINT,
            FilingStatus::MarriedSeparate => &MARRIED_SEPARATE,
            FilingStatus::HeadOfHousehold => &HEAD_OF_HOUSEHOLD,
        }
    }

    /// Net earnings above which the additional Medicare tax applies
    pub fn additional_medicare_threshold(self) -> Decimal {
        match self {
            FilingStatus::MarriedJoint => dec!(250000),
            FilingStatus::MarriedSeparate => dec!(125000),
            FilingStatus::Single | FilingStatus::HeadOfHousehold => dec!(200000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedJoint,
        FilingStatus::MarriedSeparate,
        FilingStatus::HeadOfHousehold,
    ];

    #[test]
    fn standard_deductions() {
        assert_eq!(FilingStatus::Single.standard_deduction(), dec!(14600));
        assert_eq!(FilingStatus::MarriedSeparate.standard_deduction(), dec!(14600));
        assert_eq!(FilingStatus::HeadOfHousehold.standard_deduction(), dec!(21900));
        assert_eq!(FilingStatus::MarriedJoint.standard_deduction(), dec!(29200));
    }

    #[test]
    fn brackets_ascending_with_open_top() {
        for status in ALL {
            let brackets = status.brackets();
            assert_eq!(brackets.len(), 7);
            let uppers: Vec<_> = brackets.iter().filter_map(|b| b.upper).collect();
            assert_eq!(uppers.len(), 6);
            assert!(uppers.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(brackets[6].upper, None);
            let rates: Vec<_> = brackets.iter().map(|b| b.rate).collect();
            assert_eq!(
                rates,
                vec![
                    dec!(0.10),
                    dec!(0.12),
                    dec!(0.22),
                    dec!(0.24),
                    dec!(0.32),
                    dec!(0.35),
                    dec!(0.37)
                ]
            );
        }
    }

    #[test]
    fn bracket_upper_bounds() {
        let uppers = |status: FilingStatus| -> Vec<Decimal> {
            status.brackets().iter().filter_map(|b| b.upper).collect()
        };
        assert_eq!(
            uppers(FilingStatus::Single),
            vec![
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(609350)
            ]
        );
        assert_eq!(
            uppers(FilingStatus::MarriedJoint),
            vec![
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200)
            ]
        );
        assert_eq!(
            uppers(FilingStatus::MarriedSeparate),
            vec![
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(365600)
            ]
        );
        assert_eq!(
            uppers(FilingStatus::HeadOfHousehold),
            vec![
                dec!(16550),
                dec!(63100),
                dec!(100500),
                dec!(191950),
                dec!(243700),
                dec!(609350)
            ]
        );
    }

    #[test]
    fn additional_medicare_thresholds() {
        assert_eq!(FilingStatus::MarriedJoint.additional_medicare_threshold(), dec!(250000));
        assert_eq!(FilingStatus::MarriedSeparate.additional_medicare_threshold(), dec!(125000));
        assert_eq!(FilingStatus::Single.additional_medicare_threshold(), dec!(200000));
        assert_eq!(FilingStatus::HeadOfHousehold.additional_medicare_threshold(), dec!(200000));
    }
}
