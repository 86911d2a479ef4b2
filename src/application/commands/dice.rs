//! Dice rolling: `NdS` terms and constants joined by `+`

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex_lite::Regex;
use thiserror::Error;

use crate::application::context::AppContext;
use crate::application::errors::DispatchError;
use crate::application::messaging::CommandDispatcher;
use crate::domain::entities::{Command, Message, MAX_CHARACTERS};
use crate::domain::traits::{CommandHandler, HandlerResult};

pub const MAX_DICE_ROLLS: u64 = 100;
pub const MAX_DIE_SIDES: u64 = 1000;

static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:(\d+)d(\d+)|(\d+))$").unwrap());
static PLUS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\+\s*").unwrap());

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("Invalid expression")]
    InvalidExpression,

    #[error("Too many rolls: {0}")]
    TooManyRolls(String),

    #[error("Too many sides: {0}")]
    TooManySides(String),

    #[error("Total too large")]
    TotalTooLarge,
}

/// One `+`-separated term of an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Term {
    Dice { count: u64, sides: u64 },
    Constant(u64),
}

pub struct RollCommand;

pub fn register(dispatcher: &mut CommandDispatcher) -> Result<(), DispatchError> {
    dispatcher.register(Command::new("roll", RollCommand).with_description("Roll dice, e.g. `1d6 + 2d4 + 3`"))?;
    dispatcher.register(Command::new("r", RollCommand).with_description("Alias for `roll`"))?;
    Ok(())
}

pub fn help(prefix: &str) -> String {
    format!(
        "```
Dice:
  {p}roll or {p}r <dice expression>
    Roll dice. A dice expression is a number of dice rolls or constant
    modifiers separated by plus signs. A dice roll is the number of times
    a die is rolled and the number of sides on the die, separated by the
    letter \"d\". For example, \"1d6 + 2d4 + 3\" rolls one 6-sided die and
    two 4-sided dice, then adds 3.
```",
        p = prefix
    )
}

pub fn parse_expression(expression: &str) -> Result<Vec<Term>, DiceError> {
    PLUS.split(expression.trim()).map(parse_term).collect()
}

fn parse_term(term: &str) -> Result<Term, DiceError> {
    let captures = TERM.captures(term).ok_or(DiceError::InvalidExpression)?;
    let number = |i: usize| -> Result<Option<u64>, DiceError> {
        captures
            .get(i)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| DiceError::InvalidExpression))
            .transpose()
    };

    if let Some(constant) = number(3)? {
        return Ok(Term::Constant(constant));
    }
    let (Some(count), Some(sides)) = (number(1)?, number(2)?) else {
        return Err(DiceError::InvalidExpression);
    };
    if count > MAX_DICE_ROLLS {
        return Err(DiceError::TooManyRolls(term.to_string()));
    }
    if sides > MAX_DIE_SIDES {
        return Err(DiceError::TooManySides(term.to_string()));
    }
    Ok(Term::Dice { count, sides })
}

/// Roll every term; a zero-sided die always shows 0
pub fn roll<R: Rng>(terms: &[Term], rng: &mut R) -> Vec<Vec<u64>> {
    terms
        .iter()
        .map(|term| match *term {
            Term::Constant(value) => vec![value],
            Term::Dice { count, sides } => (0..count)
                .map(|_| if sides == 0 { 0 } else { rng.gen_range(1..=sides) })
                .collect(),
        })
        .collect()
}

/// `[a + b] + c = **total**`, or just `**total**` when nothing would be shown
pub fn format_results(results: &[Vec<u64>]) -> Result<String, DiceError> {
    let parts: Vec<String> = results
        .iter()
        .filter(|rolls| !rolls.is_empty())
        .map(|rolls| match rolls.as_slice() {
            [single] => single.to_string(),
            many => format!(
                "[{}]",
                many.iter().map(u64::to_string).collect::<Vec<_>>().join(" + ")
            ),
        })
        .collect();
    let expression = parts.join(" + ");
    let total = results
        .iter()
        .flatten()
        .try_fold(0u64, |sum, &value| sum.checked_add(value))
        .ok_or(DiceError::TotalTooLarge)?;

    if expression == total.to_string() || expression.chars().count() > MAX_CHARACTERS {
        Ok(format!("**{}**", total))
    } else {
        Ok(format!("{} = **{}**", expression, total))
    }
}

/// Parse, roll and format in one synchronous step
fn roll_expression(expression: &str) -> Result<String, DiceError> {
    let terms = parse_expression(expression)?;
    let results = roll(&terms, &mut rand::thread_rng());
    format_results(&results)
}

#[async_trait]
impl CommandHandler for RollCommand {
    async fn invoke(&self, ctx: &AppContext, message: &Message) -> HandlerResult {
        let expression = ctx.command_args(message).unwrap_or_default();
        let reply = match roll_expression(&expression) {
            Ok(reply) => reply,
            Err(e) => e.to_string(),
        };
        Ok(Some(reply))
    }
}
