//! Turns a [`DiceRequest`] into rolls and a result.
//!
//! Every loop here terminates: explosions and rerolls either run on a finite
//! budget, or are unbounded only where the next roll has a nonzero chance of
//! ending the loop. Cases that could never end are answered in closed form.

use super::error::{ExecuteError, MAX_DICE};
use super::execution_log::LogBuilder;
use super::request::{DiceRequest, Repeat};
use super::roller::Roller;
use super::value::DicePartValue;
use super::RResult;
use crate::common::{Decimal, Float, UInt};
use crate::options::DiceOptions;

/// Rolls `request`, records it in `log` and returns its result.
pub fn execute(
    request: &DiceRequest,
    roller: &mut dyn Roller,
    options: &DiceOptions,
    log: &mut LogBuilder,
) -> RResult<Float> {
    if request.quantity.is_infinite() && request.target.is_some() {
        log::debug!("{} hits infinitely often", request);
        log.add(request, &[], Float::INFINITY);
        return Ok(Float::INFINITY);
    }
    let mut dice = Executor {
        request,
        roller,
        options,
    };
    dice.guard()?;

    let rolls = dice.perform_rolls();
    let mut rolls = if request.drop_lowest.is_some() || request.keep_highest.is_some() {
        drop_and_keep(rolls, request.drop_lowest, request.keep_highest)
    } else {
        rolls
    };

    let counter = request.is_counted().then(|| count(request, &rolls));
    if request.sort_descending {
        rolls.sort_by(|a, b| b.cmp(a));
    }
    let result = match counter {
        Some(counter) => counter as Float,
        None => rolls.iter().map(DicePartValue::as_float).fold(0.0, |sum, x| sum + x),
    };

    log::debug!("{} rolled {} dice for {}", request, rolls.len(), Decimal(result));
    log.add(request, &rolls, result);
    Ok(result)
}

/// Hits minus failures. A roll meeting the target is never also a failure.
fn count(request: &DiceRequest, rolls: &[DicePartValue]) -> i64 {
    rolls.iter().fold(0, |counter, &roll| {
        if request.target.map_or(false, |target| roll >= target) {
            counter + 1
        } else if request.failure.map_or(false, |failure| roll <= failure) {
            counter - 1
        } else {
            counter
        }
    })
}

/// Drops the lowest `drop` rolls, then keeps the highest `keep` of the rest.
/// Survivors stay in the order they were rolled.
fn drop_and_keep(
    rolls: Vec<DicePartValue>,
    drop: Option<DicePartValue>,
    keep: Option<DicePartValue>,
) -> Vec<DicePartValue> {
    let drop = match drop {
        Some(drop) => match drop.value() {
            Some(drop) => drop,
            None => return Vec::new(),
        },
        None => 0,
    };

    let mut indexed: Vec<_> = rolls.into_iter().enumerate().collect();
    indexed.sort_by(|(i, a), (j, b)| a.cmp(b).then(i.cmp(j)));
    let remaining = indexed.len().saturating_sub(to_len(drop));
    let mut survivors = indexed.split_off(indexed.len() - remaining);
    if let Some(keep) = keep.and_then(|keep| keep.value()) {
        let cut = survivors.len().saturating_sub(to_len(keep));
        survivors.drain(..cut);
    }

    survivors.sort_by_key(|&(i, _)| i);
    survivors.into_iter().map(|(_, roll)| roll).collect()
}

fn to_len(x: UInt) -> usize {
    usize::try_from(x).unwrap_or(usize::MAX)
}

struct Executor<'r, 'a> {
    request: &'r DiceRequest,
    roller: &'a mut dyn Roller,
    options: &'a DiceOptions,
}

impl Executor<'_, '_> {
    fn explode_budget(&self) -> Option<Option<UInt>> {
        self.request
            .explode
            .as_ref()
            .map(|explode| explode.budget(self.options.default_explosion_recursions))
    }

    fn reroll_budget(&self, reroll: &Repeat) -> Option<UInt> {
        reroll.budget(self.options.default_rerolls)
    }

    /// Rejects requests asking for more than [`MAX_DICE`] rolls before rolling anything.
    /// An iteration cap of zero still rolls every die once, so it counts as one.
    fn guard(&self) -> RResult<()> {
        let request = self.request;
        let iterations = |repeat: Option<Repeat>| {
            repeat
                .and_then(|repeat| repeat.iterations)
                .map_or(Some(1), |x| x.value().map(|x| x.max(1)))
        };
        let factors = [
            self.capped_quantity().value(),
            iterations(request.explode),
            iterations(request.reroll),
        ];
        let total = factors
            .into_iter()
            .try_fold(1, |acc: UInt, x| x.map(|x| acc.saturating_mul(x)));
        match total {
            Some(total) if total > MAX_DICE => {
                log::warn!("refusing to roll {} ({} dice)", request, total);
                Err(ExecuteError::DoS(request.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// An infinite quantity is rolled as often as a finite keep allows.
    fn capped_quantity(&self) -> DicePartValue {
        match self.request.keep_highest {
            Some(keep) if self.request.quantity.is_infinite() && !keep.is_infinite() => keep,
            _ => self.request.quantity,
        }
    }

    fn perform_rolls(&mut self) -> Vec<DicePartValue> {
        let quantity = match self.capped_quantity().value() {
            Some(quantity) => quantity,
            None => return vec![DicePartValue::INFINITY],
        };
        if let Some(max) = self.unclearable_reroll() {
            log::debug!("no die of {} can clear its reroll", self.request);
            return vec![max; to_len(quantity)];
        }
        (0..quantity)
            .map(|_| {
                let roll = self.roll_one(None);
                let roll = self.explode(roll);
                self.reroll(roll)
            })
            .collect()
    }

    /// With an unbounded reroll no die can ever clear, every die ends up at the
    /// highest total it can reach.
    fn unclearable_reroll(&self) -> Option<DicePartValue> {
        let reroll = self.request.reroll.as_ref()?;
        if self.reroll_budget(reroll).is_some() {
            return None;
        }
        let max = self.max_exploded_single_roll();
        (max <= reroll.threshold).then(|| max)
    }

    /// Draws a single die. Without an explicit `min`, an unbounded reroll
    /// threshold within the die's range is used as the lowest face.
    fn roll_one(&mut self, min: Option<UInt>) -> DicePartValue {
        let sides = match self.request.sides.value() {
            Some(0) => return DicePartValue::ZERO,
            Some(sides) => sides,
            None => return DicePartValue::INFINITY,
        };
        let min = min.unwrap_or_else(|| self.min_draw(sides));
        DicePartValue::rolled(self.roller.roll(min.clamp(1, sides), sides))
    }

    /// The lowest face drawn when no minimum is asked for.
    fn min_draw(&self, sides: UInt) -> UInt {
        match &self.request.reroll {
            Some(reroll) if self.reroll_budget(reroll).is_none() => reroll
                .threshold
                .value()
                .filter(|&threshold| threshold <= sides)
                .map_or(1, |threshold| threshold.max(1)),
            _ => 1,
        }
    }

    fn explode(&mut self, roll: DicePartValue) -> DicePartValue {
        let (threshold, budget) = match (&self.request.explode, self.explode_budget()) {
            (Some(explode), Some(budget)) if !roll.is_infinite() => (explode.threshold, budget),
            _ => return roll,
        };
        // every draw would explode again
        let floor = self.request.sides.value().map_or(1, |sides| self.min_draw(sides));
        if budget.is_none() && threshold <= floor {
            return DicePartValue::INFINITY;
        }

        let mut total = roll;
        let mut last = roll;
        let mut budget = budget;
        while budget != Some(0) && last >= threshold {
            last = self.roll_one(None);
            total = total.plus(last);
            budget = budget.map(|x| x - 1);
        }
        total
    }

    fn reroll(&mut self, roll: DicePartValue) -> DicePartValue {
        let reroll = match self.request.reroll {
            Some(reroll) if roll <= reroll.threshold => reroll,
            _ => return roll,
        };
        let threshold = reroll.threshold;

        match self.reroll_budget(&reroll) {
            Some(0) => roll,
            Some(budget) => {
                for _ in 1..budget {
                    let candidate = self.roll_one(None);
                    let candidate = self.explode(candidate);
                    if candidate > threshold {
                        return candidate;
                    }
                }
                let last = self.roll_one(None);
                self.explode(last)
            }
            None => self.reroll_until_above(threshold),
        }
    }

    /// Rerolls without a budget. Answers in closed form whenever no roll could
    /// ever clear `threshold`.
    fn reroll_until_above(&mut self, threshold: DicePartValue) -> DicePartValue {
        let max = self.max_exploded_single_roll();
        let threshold = match threshold.value() {
            Some(threshold) if max > threshold => threshold,
            _ => return max,
        };

        let explode_threshold = match &self.request.explode {
            Some(explode) if explode.threshold <= self.request.sides => explode.threshold,
            _ => return self.roll_one(Some(threshold + 1)),
        };
        let explode_threshold = match explode_threshold.value() {
            Some(x) => x,
            None => return DicePartValue::INFINITY,
        };

        let mut total: UInt = 0;
        while total <= threshold {
            let direct = threshold - total;
            let required = direct.min(explode_threshold);
            let mut die = self.roll_one(Some(required.max(1)));
            if die > direct && die >= explode_threshold {
                die = self.explode(die);
            }
            match die.value() {
                Some(die) => total = total.saturating_add(die),
                None => return DicePartValue::INFINITY,
            }
        }
        DicePartValue::rolled(total)
    }

    /// The highest total a single die can reach, explosions included.
    fn max_exploded_single_roll(&self) -> DicePartValue {
        let sides = match self.request.sides.value() {
            Some(sides) => sides,
            None => return DicePartValue::INFINITY,
        };
        match (&self.request.explode, self.explode_budget()) {
            (Some(explode), Some(budget)) if explode.threshold <= sides => match budget {
                None => DicePartValue::INFINITY,
                Some(0) => DicePartValue::rolled(sides),
                Some(iterations) => {
                    DicePartValue::rolled(iterations.saturating_add(1).saturating_mul(sides))
                }
            },
            _ => DicePartValue::rolled(sides),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ExpressionFormat, QueryFormat};
    use crate::roll::roller::ScriptedRoller;

    fn value(x: Float) -> DicePartValue {
        DicePartValue::new(x).unwrap()
    }

    fn repeat(threshold: Float, iterations: Option<Float>, unbounded: bool) -> Option<Repeat> {
        Some(Repeat {
            threshold: value(threshold),
            iterations: iterations.map(value),
            unbounded,
        })
    }

    fn run(request: &DiceRequest, roller: &mut ScriptedRoller) -> (RResult<Float>, String) {
        let options = DiceOptions::default();
        let mut log = LogBuilder::new(QueryFormat::AllDice, ExpressionFormat::AllRolls, 20);
        let result = execute(request, roller, &options, &mut log);
        (result, log.build())
    }

    #[test]
    fn test_drop_and_keep() {
        let rolls: Vec<_> = [10, 19, 12, 1, 18, 8, 8, 4, 18, 15]
            .iter()
            .map(|&x| DicePartValue::rolled(x))
            .collect();
        let kept = |drop: Option<Float>, keep: Option<Float>| -> Vec<UInt> {
            drop_and_keep(rolls.clone(), drop.map(value), keep.map(value))
                .iter()
                .filter_map(DicePartValue::value)
                .collect()
        };
        assert_eq!(kept(None, Some(6.0)), vec![10, 19, 12, 18, 18, 15]);
        assert_eq!(kept(Some(6.0), Some(6.0)), vec![19, 18, 18, 15]);
        assert_eq!(kept(Some(8.0), None), vec![19, 18]);
        assert_eq!(kept(Some(20.0), None), Vec::<UInt>::new());
        assert_eq!(kept(Some(Float::INFINITY), Some(3.0)), Vec::<UInt>::new());
        assert_eq!(kept(None, Some(Float::INFINITY)), kept(None, None));
        assert_eq!(kept(Some(1.0), Some(2.0)), vec![19, 18]);
    }

    #[test]
    fn test_ties_keep_earliest() {
        let rolls = vec![DicePartValue::rolled(5), DicePartValue::rolled(5), DicePartValue::rolled(5)];
        let kept = drop_and_keep(rolls, Some(value(1.0)), Some(value(1.0)));
        assert_eq!(kept, vec![DicePartValue::rolled(5)]);
    }

    #[test]
    fn test_infinite_target_rolls_nothing() {
        let mut request = DiceRequest::new(DicePartValue::INFINITY, value(20.0));
        request.target = Some(value(20.0));
        let mut roller = ScriptedRoller::new();
        let (result, log) = run(&request, &mut roller);
        assert_eq!(result, Ok(Float::INFINITY));
        assert_eq!(log, "`∞d20t20`: Hit: ∞");
    }

    #[test]
    fn test_dos_guard() {
        let mut roller = ScriptedRoller::new();
        let request = DiceRequest::new(value(1_000_001.0), value(6.0));
        assert_eq!(
            run(&request, &mut roller).0,
            Err(ExecuteError::DoS("1000001d6".to_owned()))
        );

        let mut request = DiceRequest::new(value(1000.0), value(6.0));
        request.explode = repeat(6.0, Some(1001.0), false);
        let err = run(&request, &mut roller).0.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Attempted DoS with over 1000000 dice detected. 1000d6e6;1001"
        );

        let mut request = DiceRequest::new(DicePartValue::INFINITY, value(6.0));
        request.keep_highest = Some(value(2_000_000.0));
        assert!(matches!(run(&request, &mut roller).0, Err(ExecuteError::DoS(_))));

        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.explode = repeat(6.0, Some(0.0), false);
        request.reroll = repeat(6.0, Some(2_147_483_647.0), false);
        assert_eq!(
            run(&request, &mut roller).0,
            Err(ExecuteError::DoS("1d6e6;0r6;2147483647".to_owned()))
        );

        let mut request = DiceRequest::new(value(1000.0), value(1.0));
        request.explode = repeat(2.0, Some(Float::INFINITY), false);
        let mut roller = ScriptedRoller::new().otherwise(1);
        assert_eq!(run(&request, &mut roller).0, Ok(1000.0));
    }

    #[test]
    fn test_zero_sided() {
        let mut request = DiceRequest::new(value(3.0), value(0.0));
        request.explode = repeat(0.0, None, false);
        let mut roller = ScriptedRoller::new();
        assert_eq!(run(&request, &mut roller).0, Ok(0.0));
    }

    #[test]
    fn test_explosion_from_reroll_floor() {
        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.explode = repeat(3.0, None, true);
        request.reroll = repeat(5.0, None, true);
        let mut roller = ScriptedRoller::new().script(5, 6, &[6]);
        assert_eq!(run(&request, &mut roller).0, Ok(Float::INFINITY));
    }

    #[test]
    fn test_infinite_cap_is_unbounded() {
        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.explode = repeat(1.0, Some(Float::INFINITY), false);
        let mut roller = ScriptedRoller::new().script(1, 6, &[3]);
        assert_eq!(run(&request, &mut roller).0, Ok(Float::INFINITY));
    }

    #[test]
    fn test_unreachable_reroll() {
        // no roll of a d6 exploding at most twice can exceed 18
        let mut request = DiceRequest::new(value(2.0), value(6.0));
        request.explode = repeat(6.0, Some(2.0), false);
        request.reroll = repeat(20.0, None, true);
        let (result, log) = run(&request, &mut ScriptedRoller::new());
        assert_eq!(result, Ok(36.0));
        assert_eq!(log, "`2d6e6;2ir20`: `[18, 18]` Sum: 36");

        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.reroll = repeat(6.0, None, true);
        assert_eq!(run(&request, &mut ScriptedRoller::new()).0, Ok(6.0));

        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.explode = repeat(7.0, None, false);
        request.reroll = repeat(Float::INFINITY, None, true);
        assert_eq!(run(&request, &mut ScriptedRoller::new()).0, Ok(6.0));

        let mut request = DiceRequest::new(value(3.0), value(6.0));
        request.explode = repeat(6.0, None, true);
        request.reroll = repeat(Float::INFINITY, None, true);
        assert_eq!(run(&request, &mut ScriptedRoller::new()).0, Ok(Float::INFINITY));

        let mut request = DiceRequest::new(value(1.0), value(6.0));
        request.explode = repeat(6.0, None, false);
        request.reroll = repeat(200.0, None, true);
        assert_eq!(run(&request, &mut ScriptedRoller::new()).0, Ok(66.0));
    }

    #[test]
    fn test_empty_pool_sums_to_positive_zero() {
        let mut roller = ScriptedRoller::new().otherwise(4);
        for (quantity, drop, keep) in [
            (0.0, None, None),
            (2.0, Some(Float::INFINITY), None),
            (Float::INFINITY, None, Some(0.0)),
        ] {
            let mut request = DiceRequest::new(value(quantity), value(6.0));
            request.drop_lowest = drop.map(value);
            request.keep_highest = keep.map(value);
            let result = run(&request, &mut roller).0.unwrap();
            assert!(result == 0.0 && result.is_sign_positive(), "{}", request);
        }
    }

    #[test]
    fn test_finite_reroll_keeps_last() {
        let mut request = DiceRequest::new(value(1.0), value(20.0));
        request.reroll = repeat(15.0, Some(3.0), false);
        let mut roller = ScriptedRoller::new().script(1, 20, &[5, 8, 15, 2]);
        assert_eq!(run(&request, &mut roller).0, Ok(2.0));
        assert_eq!(roller.remaining(1, 20), 0);

        request.reroll = repeat(15.0, Some(0.0), false);
        let mut roller = ScriptedRoller::new().script(1, 20, &[5]);
        assert_eq!(run(&request, &mut roller).0, Ok(5.0));
    }

    #[test]
    fn test_counting() {
        let mut request = DiceRequest::new(value(4.0), value(20.0));
        request.target = Some(value(10.0));
        request.failure = Some(value(10.0));
        let mut roller = ScriptedRoller::new().script(1, 20, &[10, 9, 11, 1]);
        let (result, log) = run(&request, &mut roller);
        assert_eq!(result, Ok(0.0));
        assert_eq!(log, "`4d20t10f10`: `[10, 9, 11, 1]` Hit: 0");

        let mut request = DiceRequest::new(value(3.0), value(20.0));
        request.failure = Some(value(2.0));
        let mut roller = ScriptedRoller::new().script(1, 20, &[1, 2, 3]);
        assert_eq!(run(&request, &mut roller).0, Ok(-2.0));
    }
}
