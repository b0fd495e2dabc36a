#[cfg(feature = "serde-support")]
use serde::{Deserialize, Serialize};

/// Whether a dice term's log entry lists the individual rolls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum ExpressionFormat {
    /// Only the total.
    TotalOnly,
    /// Every roll, however many.
    AllRolls,
    /// Every roll as long as there are no more than the output cutoff.
    LimitedRolls,
}

/// Which dice terms make it into the log.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
pub enum QueryFormat {
    ResultOnly,
    AllDice,
    /// Only the dice term evaluated last.
    LastDie,
}

/// Defaults applied to every evaluation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-support", serde(default))]
pub struct DiceOptions {
    /// Explosion cap when a term names a threshold but no iteration count.
    pub default_explosion_recursions: u32,
    /// Reroll cap when a term names a threshold but no iteration count.
    pub default_rerolls: u32,
    pub default_expression_format: ExpressionFormat,
    pub default_query_format: QueryFormat,
    /// Roll count above which [`ExpressionFormat::LimitedRolls`] stops listing rolls.
    pub default_output_cutoff: usize,
}

impl Default for DiceOptions {
    fn default() -> Self {
        Self {
            default_explosion_recursions: 10,
            default_rerolls: 10,
            default_expression_format: ExpressionFormat::LimitedRolls,
            default_query_format: QueryFormat::AllDice,
            default_output_cutoff: 20,
        }
    }
}

#[cfg(all(test, feature = "serde-support"))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let options: DiceOptions = toml::from_str(
            r#"
            default_rerolls = 3
            default_query_format = "LastDie"
            "#,
        )
        .unwrap();
        assert_eq!(
            options,
            DiceOptions {
                default_rerolls: 3,
                default_query_format: QueryFormat::LastDie,
                ..DiceOptions::default()
            }
        );
    }
}
