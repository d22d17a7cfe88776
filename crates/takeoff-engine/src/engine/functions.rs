//! Built-in formula functions and their metadata.
//!
//! Conventions:
//! - Names are matched case-insensitively (`ROUNDUP`, `roundUp`, `roundup`).
//! - An optional `Math.` qualifier is accepted, so formulas written against
//!   the JavaScript-style vocabulary keep working.
//! - If you add a function, add a row to `BUILTINS` and an arm to [`Function::apply`].

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Round,
    RoundUp,
    RoundDown,
    Floor,
    Ceil,
    Abs,
    Sqrt,
    Pow,
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exactly(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

pub struct Builtin {
    pub name: &'static str,
    pub function: Function,
    pub arity: Arity,
    pub description: &'static str,
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "round",
        function: Function::Round,
        arity: Arity::Exactly(1),
        description: "Nearest integer, halves away from zero",
    },
    Builtin {
        name: "roundup",
        function: Function::RoundUp,
        arity: Arity::Exactly(1),
        description: "Smallest integer not less than the argument",
    },
    Builtin {
        name: "rounddown",
        function: Function::RoundDown,
        arity: Arity::Exactly(1),
        description: "Largest integer not greater than the argument",
    },
    Builtin {
        name: "floor",
        function: Function::Floor,
        arity: Arity::Exactly(1),
        description: "Largest integer not greater than the argument",
    },
    Builtin {
        name: "ceil",
        function: Function::Ceil,
        arity: Arity::Exactly(1),
        description: "Smallest integer not less than the argument",
    },
    Builtin {
        name: "abs",
        function: Function::Abs,
        arity: Arity::Exactly(1),
        description: "Absolute value",
    },
    Builtin {
        name: "sqrt",
        function: Function::Sqrt,
        arity: Arity::Exactly(1),
        description: "Square root",
    },
    Builtin {
        name: "pow",
        function: Function::Pow,
        arity: Arity::Exactly(2),
        description: "First argument raised to the second",
    },
    Builtin {
        name: "min",
        function: Function::Min,
        arity: Arity::AtLeast(1),
        description: "Smallest of the arguments",
    },
    Builtin {
        name: "max",
        function: Function::Max,
        arity: Arity::AtLeast(1),
        description: "Largest of the arguments",
    },
];

/// Qualifier accepted in front of a function name.
pub const QUALIFIER: &str = "Math";

impl Function {
    pub fn lookup(name: &str) -> Option<&'static Builtin> {
        BUILTINS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Round => "round",
            Function::RoundUp => "roundup",
            Function::RoundDown => "rounddown",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Abs => "abs",
            Function::Sqrt => "sqrt",
            Function::Pow => "pow",
            Function::Min => "min",
            Function::Max => "max",
        }
    }

    /// Apply to already-evaluated arguments. Arity is checked at parse time.
    pub fn apply(self, args: &[f64]) -> f64 {
        match self {
            Function::Round => args[0].round(),
            Function::RoundUp | Function::Ceil => args[0].ceil(),
            Function::RoundDown | Function::Floor => args[0].floor(),
            Function::Abs => args[0].abs(),
            Function::Sqrt => args[0].sqrt(),
            Function::Pow => args[0].powf(args[1]),
            // NaN poisons the result like the arithmetic operators do.
            Function::Min => args.iter().copied().fold(f64::INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.min(x) }
            }),
            Function::Max => args.iter().copied().fold(f64::NEG_INFINITY, |acc, x| {
                if acc.is_nan() || x.is_nan() { f64::NAN } else { acc.max(x) }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Function::lookup("ROUNDUP").map(|b| b.function), Some(Function::RoundUp));
        assert_eq!(Function::lookup("RoundDown").map(|b| b.function), Some(Function::RoundDown));
        assert!(Function::lookup("log").is_none());
    }

    #[test]
    fn test_round_ties_away_from_zero() {
        assert_eq!(Function::Round.apply(&[2.5]), 3.0);
        assert_eq!(Function::Round.apply(&[-2.5]), -3.0);
        assert_eq!(Function::Round.apply(&[2.4]), 2.0);
    }

    #[test]
    fn test_roundup_rounddown() {
        assert_eq!(Function::RoundUp.apply(&[2.5]), 3.0);
        assert_eq!(Function::RoundDown.apply(&[2.5]), 2.0);
        assert_eq!(Function::RoundUp.apply(&[-2.5]), -2.0);
    }

    #[test]
    fn test_min_max_variadic() {
        assert_eq!(Function::Min.apply(&[3.0, 1.0, 2.0]), 1.0);
        assert_eq!(Function::Max.apply(&[3.0, 1.0, 2.0]), 3.0);
        assert!(Function::Max.apply(&[1.0, f64::NAN]).is_nan());
    }

    #[test]
    fn test_every_function_has_metadata() {
        for b in BUILTINS {
            assert_eq!(b.function.name(), b.name);
        }
    }

    #[test]
    fn test_arity() {
        assert!(Arity::Exactly(1).accepts(1));
        assert!(!Arity::Exactly(1).accepts(2));
        assert!(Arity::AtLeast(1).accepts(5));
        assert!(!Arity::AtLeast(1).accepts(0));
    }
}
