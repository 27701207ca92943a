//! Demo credit score.
//!
//! Entertainment only: the number is derived from a handful of local signals
//! plus a random term. It is not a financial score.

use rand::Rng;
use rust_decimal::Decimal;
use std::fmt;

use crate::account::CustomerId;

pub const MIN_SCORE: u32 = 300;
pub const MAX_SCORE: u32 = 900;

#[derive(Debug, Clone, PartialEq)]
pub struct CreditInputs {
    pub customer_id: Option<CustomerId>,
    pub total_balance: Decimal,
    pub account_count: usize,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditBand {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl CreditBand {
    pub fn for_score(score: u32) -> Self {
        match score {
            s if s >= 750 => CreditBand::Excellent,
            s if s >= 700 => CreditBand::Good,
            s if s >= 650 => CreditBand::Fair,
            s if s >= 600 => CreditBand::Poor,
            _ => CreditBand::VeryPoor,
        }
    }

    pub fn range_label(&self) -> &'static str {
        match self {
            CreditBand::Excellent => "Excellent (750-900)",
            CreditBand::Good => "Good (700-749)",
            CreditBand::Fair => "Fair (650-699)",
            CreditBand::Poor => "Poor (600-649)",
            CreditBand::VeryPoor => "Very Poor (300-599)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CreditBand::Excellent => {
                "Excellent credit score! You qualify for the best loan rates and terms."
            }
            CreditBand::Good => "Good credit score. You can get loans at competitive rates.",
            CreditBand::Fair => {
                "Fair credit score. You may get loans but at higher interest rates."
            }
            CreditBand::Poor => "Poor credit score. Limited loan options with high interest rates.",
            CreditBand::VeryPoor => {
                "Very poor credit score. Focus on improving your credit health."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreditReport {
    pub score: u32,
    pub band: CreditBand,
}

impl CreditReport {
    pub fn from_score(score: u32) -> Self {
        let score = score.clamp(MIN_SCORE, MAX_SCORE);
        Self {
            score,
            band: CreditBand::for_score(score),
        }
    }

    pub fn range_label(&self) -> &'static str {
        self.band.range_label()
    }

    pub fn description(&self) -> &'static str {
        self.band.description()
    }
}

impl fmt::Display for CreditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}\n{}\n(demo score, not a financial assessment)",
            self.score,
            self.range_label(),
            self.description()
        )
    }
}

fn balance_points(total: Decimal) -> u32 {
    if total > Decimal::from(10_000) {
        100
    } else if total > Decimal::from(5_000) {
        75
    } else if total > Decimal::from(1_000) {
        50
    } else {
        25
    }
}

pub fn score<R: Rng>(inputs: &CreditInputs, rng: &mut R) -> u32 {
    if inputs.account_count == 0 {
        return MIN_SCORE;
    }

    let age = inputs.customer_id.unwrap_or(1);
    let age_points = age.saturating_mul(20).min(150) as u32;
    let account_points = (inputs.account_count as u32).saturating_mul(30).min(90);
    let activity_points = (inputs.transaction_count as u32).saturating_mul(5).min(50);
    let random_points: u32 = rng.gen_range(0..100);

    let total = MIN_SCORE
        + age_points
        + balance_points(inputs.total_balance)
        + account_points
        + activity_points
        + random_points;
    total.clamp(MIN_SCORE, MAX_SCORE)
}

pub fn report<R: Rng>(inputs: &CreditInputs, rng: &mut R) -> CreditReport {
    CreditReport::from_score(score(inputs, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(id: Option<CustomerId>, balance: i64, accounts: usize, txs: usize) -> CreditInputs {
        CreditInputs {
            customer_id: id,
            total_balance: Decimal::from(balance),
            account_count: accounts,
            transaction_count: txs,
        }
    }

    #[test]
    fn test_zero_accounts_is_base() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(score(&inputs(Some(9), 50_000, 0, 40), &mut rng), 300);
    }

    #[test]
    fn test_score_always_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for id in [None, Some(0), Some(1), Some(8), Some(u64::MAX)] {
            for balance in [-5_000, 0, 1_001, 5_001, 10_001, 1_000_000] {
                for accounts in [0, 1, 3, 100] {
                    for txs in [0, 2, 10, 10_000] {
                        let s = score(&inputs(id, balance, accounts, txs), &mut rng);
                        assert!((MIN_SCORE..=MAX_SCORE).contains(&s), "score {}", s);
                    }
                }
            }
        }
    }

    #[test]
    fn test_component_caps() {
        // 300 + 150 + 100 + 90 + 50 = 690, random adds 0..100
        let mut rng = StdRng::seed_from_u64(1);
        let s = score(&inputs(Some(100), 20_000, 5, 50), &mut rng);
        assert!((690..790).contains(&s));

        // 300 + 20 + 25 + 30 + 0 = 375
        let s = score(&inputs(Some(1), 10, 1, 0), &mut rng);
        assert!((375..475).contains(&s));
    }

    #[test]
    fn test_bands() {
        assert_eq!(CreditBand::for_score(900), CreditBand::Excellent);
        assert_eq!(CreditBand::for_score(750), CreditBand::Excellent);
        assert_eq!(CreditBand::for_score(749), CreditBand::Good);
        assert_eq!(CreditBand::for_score(650), CreditBand::Fair);
        assert_eq!(CreditBand::for_score(600), CreditBand::Poor);
        assert_eq!(CreditBand::for_score(599), CreditBand::VeryPoor);

        let report = CreditReport::from_score(720);
        assert_eq!(report.range_label(), "Good (700-749)");
        assert!(report.description().starts_with("Good credit score"));
    }
}
