//! Dice rolls

use rand::Rng;
use tracing::trace;

use super::{EvalError, Evaluator, Mode};
use crate::ast::{Keep, Primitive, Value};
use crate::env::ContainerId;
use crate::io::Sink;

const MAX_SIZE: i64 = i32::MAX as i64;

/// Most dice a single roll may throw; every roll is listed in the trace line
pub const MAX_ROLLS: i64 = 100_000;

/// Source of dice results
pub trait DiceRoller {
    /// A result in `1..=sides`
    fn roll(&mut self, sides: u32) -> u32;
}

/// Uniform rolls from the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomRoller;

impl DiceRoller for RandomRoller {
    fn roll(&mut self, sides: u32) -> u32 {
        rand::thread_rng().gen_range(1..=sides)
    }
}

/// Replays a fixed list of results, starting over when it runs out
#[derive(Debug, Clone)]
pub struct SequenceRoller {
    rolls: Vec<u32>,
    next: usize,
}

impl SequenceRoller {
    pub fn new(rolls: impl Into<Vec<u32>>) -> Self {
        SequenceRoller {
            rolls: rolls.into(),
            next: 0,
        }
    }
}

impl DiceRoller for SequenceRoller {
    fn roll(&mut self, sides: u32) -> u32 {
        if self.rolls.is_empty() {
            return 1;
        }
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next += 1;
        roll.clamp(1, sides.max(1))
    }
}

impl Evaluator {
    pub(crate) fn roll_dice(
        &mut self,
        amount: &Value,
        size: &Value,
        keep: Option<&Keep>,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let amount = self.dice_operand(amount, env, args, sink)?;
        let size = self.dice_operand(size, env, args, sink)?;
        if !(0..=MAX_ROLLS).contains(&amount) {
            return Err(EvalError::Arithmetic(format!(
                "Can not roll {} number of dice.",
                amount
            )));
        }
        if !(1..=MAX_SIZE).contains(&size) {
            return Err(EvalError::Arithmetic(format!(
                "Can not roll a dice of size {}.",
                size
            )));
        }
        let keep = match keep {
            Some(Keep::Lowest(n)) => Some((true, self.dice_operand(n, env, args, sink)?)),
            Some(Keep::Highest(n)) => Some((false, self.dice_operand(n, env, args, sink)?)),
            None => None,
        };
        if let Some((lowest, n)) = keep {
            if !(0..=amount).contains(&n) {
                return Err(EvalError::Arithmetic(format!(
                    "Can not keep the {} {} dice rolls.",
                    if lowest { "lowest" } else { "highest" },
                    n
                )));
            }
        }

        let mut rolls: Vec<i64> = (0..amount)
            .map(|_| i64::from(self.roller.roll(size as u32)))
            .collect();
        rolls.sort_unstable();
        trace!(amount, size, ?rolls, "rolled dice");

        let count = rolls.len();
        let (kept, label) = match keep {
            Some((true, n)) => (0..n as usize, format!("L{}", n)),
            Some((false, n)) => (count - n as usize..count, format!("H{}", n)),
            None => (0..count, String::new()),
        };
        let shown: Vec<String> = rolls
            .iter()
            .enumerate()
            .map(|(i, roll)| {
                if kept.contains(&i) {
                    roll.to_string()
                } else {
                    format!("({})", roll)
                }
            })
            .collect();
        sink.write_line(&format!(
            "Dice roll ({}D{}{}): {}",
            amount,
            size,
            label,
            shown.join(" ")
        ));

        let total = rolls[kept].iter().fold(Primitive::Void, |total, roll| match total {
            Primitive::Int(sum) => Primitive::Int(sum + roll),
            _ => Primitive::Int(*roll),
        });
        Ok(total)
    }

    fn dice_operand(
        &mut self,
        value: &Value,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<i64, EvalError> {
        match self.reduce(value, env, args, Mode::Full, sink)? {
            Primitive::Int(n) => Ok(n),
            other => Err(EvalError::Type(format!(
                "Can not perform a dice roll with {}.",
                self.store.type_name_of(&other.into_value())
            ))),
        }
    }
}
