//! Financial outcome labels
//!
//! The label of a historical record is derived from its gross/budget ratio.
//! The heuristic verdict is a separate, rule-based classification of a
//! quality score that is shown next to the model's prediction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ratio at or above which a film has recovered its budget
pub const BREAK_EVEN_RATIO: f64 = 1.0;

/// Ratio at or above which a film counts as a hit
pub const HIT_RATIO: f64 = 2.0;

/// Financial outcome of a film
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Outcome {
    Flop,
    Average,
    Hit,
}

impl Outcome {
    /// All outcomes in canonical class order
    pub const ALL: [Outcome; 3] = [Outcome::Flop, Outcome::Average, Outcome::Hit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Flop => "Flop",
            Outcome::Average => "Average",
            Outcome::Hit => "Hit",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Flop" => Ok(Outcome::Flop),
            "Average" => Ok(Outcome::Average),
            "Hit" => Ok(Outcome::Hit),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}

/// Derive the financial outcome of a record from its budget and gross.
///
/// A zero budget is labelled `Average` before any division takes place.
pub fn derive_label(budget: f64, gross: f64) -> Outcome {
    if budget == 0.0 {
        return Outcome::Average;
    }

    let ratio = gross / budget;

    if ratio < BREAK_EVEN_RATIO {
        Outcome::Flop
    } else if ratio < HIT_RATIO {
        Outcome::Average
    } else {
        Outcome::Hit
    }
}

/// Gross/budget ratio, `None` for a zero budget
pub fn roi(budget: f64, gross: f64) -> Option<f64> {
    if budget == 0.0 {
        None
    } else {
        Some(gross / budget)
    }
}

/// Rule-based verdict from a 0–10 quality score
pub fn heuristic_verdict(score: f64) -> Outcome {
    if score < 5.0 {
        Outcome::Flop
    } else if score < 7.0 {
        Outcome::Average
    } else {
        Outcome::Hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_thresholds() {
        assert_eq!(derive_label(10_000_000.0, 25_000_000.0), Outcome::Hit);
        assert_eq!(derive_label(10_000_000.0, 10_000_000.0), Outcome::Average);
        assert_eq!(derive_label(10_000_000.0, 5_000_000.0), Outcome::Flop);
        assert_eq!(derive_label(10_000_000.0, 20_000_000.0), Outcome::Hit);
        assert_eq!(derive_label(10_000_000.0, 19_999_999.0), Outcome::Average);
        assert_eq!(derive_label(10_000_000.0, 9_999_999.0), Outcome::Flop);
        assert_eq!(derive_label(1.0, 0.0), Outcome::Flop);
    }

    #[test]
    fn test_zero_budget_is_average() {
        for gross in [0.0, 1.0, 5_000_000.0, f64::MAX] {
            assert_eq!(derive_label(0.0, gross), Outcome::Average);
        }
    }

    #[test]
    fn test_label_depends_only_on_ratio() {
        let budgets = [1.0, 250.0, 1_000_000.0, 300_000_000.0];
        for ratio in [0.0, 0.5, 0.99, 1.0, 1.5, 1.99, 2.0, 7.5] {
            let expected = derive_label(1.0, ratio);
            for budget in budgets {
                assert_eq!(derive_label(budget, budget * ratio), expected, "ratio {ratio}");
            }
        }
    }

    #[test]
    fn test_roi() {
        assert_eq!(roi(0.0, 100.0), None);
        assert_eq!(roi(10.0, 25.0), Some(2.5));
    }

    #[test]
    fn test_heuristic_verdict_boundaries() {
        assert_eq!(heuristic_verdict(0.0), Outcome::Flop);
        assert_eq!(heuristic_verdict(4.9), Outcome::Flop);
        assert_eq!(heuristic_verdict(5.0), Outcome::Average);
        assert_eq!(heuristic_verdict(6.99), Outcome::Average);
        assert_eq!(heuristic_verdict(7.0), Outcome::Hit);
        assert_eq!(heuristic_verdict(10.0), Outcome::Hit);
    }

    #[test]
    fn test_outcome_parse_roundtrip() {
        for outcome in Outcome::ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>(), Ok(outcome));
        }
        assert!("Blockbuster".parse::<Outcome>().is_err());
    }
}
