//! Verdict combination operators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GuardError;

/// How several profile verdicts combine into one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Operator {
    /// Allowed if any profile allows. Used for allow lists and CSRF profiles.
    #[default]
    AtLeastOne,
    /// Allowed only if every profile allows. Used for deny lists.
    ForEvery,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::AtLeastOne => "at-least-one",
            Operator::ForEvery => "for-every",
        }
    }

    /// Fold already-collected verdicts.
    pub fn reduce(&self, verdicts: &[bool]) -> bool {
        match self {
            Operator::AtLeastOne => verdicts.iter().any(|v| *v),
            Operator::ForEvery => verdicts.iter().all(|v| *v),
        }
    }
}

impl FromStr for Operator {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "at-least-one" | "AT_LEAST_ONE" => Ok(Operator::AtLeastOne),
            "for-every" | "FOR_EVERY" => Ok(Operator::ForEvery),
            other => Err(GuardError::InvalidOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for Operator {
    type Error = GuardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("at-least-one".parse::<Operator>().unwrap(), Operator::AtLeastOne);
        assert_eq!("FOR_EVERY".parse::<Operator>().unwrap(), Operator::ForEvery);

        let err = "any".parse::<Operator>().unwrap_err();
        assert!(matches!(err, GuardError::InvalidOperator(ref v) if v == "any"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_reduce() {
        assert!(Operator::AtLeastOne.reduce(&[false, true]));
        assert!(!Operator::AtLeastOne.reduce(&[false, false]));
        assert!(Operator::ForEvery.reduce(&[true, true]));
        assert!(!Operator::ForEvery.reduce(&[true, false]));
    }
}
