//! Version range constraints used by the dependency rule document
//!
//! A constraint is a whitespace-separated list of clauses, all of which must hold:
//! - `>= 3.1.0` / `>=3.1.0` - greater than or equal
//! - `> 2.3`, `<= 5`, `< 6.0.0` - the remaining comparison operators
//! - `>= 3.1.0 < 6.0.0` - at least 3.1.0 and strictly below 6.0.0
//!
//! Operators may be fused to their version or separated from it by whitespace.
//! Tokens that are neither an operator nor an operator's operand are ignored.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use tracing::debug;

use crate::version::error::ConstraintError;
use crate::version::semver::parse_version;

static CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(>=|<=|>|<)(.*)$").expect("clause pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Gte,
    Lte,
    Gt,
    Lt,
}

impl Operator {
    fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">=" => Some(Operator::Gte),
            "<=" => Some(Operator::Lte),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Gte => ">=",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
        }
    }
}

/// One `{operator, version}` pair of a constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub op: Operator,
    pub version: Version,
}

impl Clause {
    pub fn satisfies(&self, version: &Version) -> bool {
        match self.op {
            Operator::Gte => version >= &self.version,
            Operator::Lte => version <= &self.version,
            Operator::Gt => version > &self.version,
            Operator::Lt => version < &self.version,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.as_str(), self.version)
    }
}

/// A parsed range expression: every clause must be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Constraint {
    clauses: Vec<Clause>,
}

impl Constraint {
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn satisfies(&self, version: &Version) -> bool {
        self.clauses.iter().all(|clause| clause.satisfies(version))
    }
}

impl FromStr for Constraint {
    type Err = ConstraintError;

    fn from_str(expression: &str) -> Result<Self, Self::Err> {
        let mut tokens = expression.split_whitespace();
        let mut clauses = Vec::new();

        while let Some(token) = tokens.next() {
            let Some(captures) = CLAUSE_RE.captures(token) else {
                debug!("Ignoring token '{}' in constraint '{}'", token, expression);
                continue;
            };

            let Some(op) = Operator::from_symbol(&captures[1]) else {
                continue;
            };

            let operand = match &captures[2] {
                "" => match tokens.next() {
                    Some(next) => next,
                    // A trailing operator without an operand constrains nothing
                    None => break,
                },
                fused => fused,
            };

            let version = parse_version(operand)
                .ok_or_else(|| ConstraintError::InvalidVersion(operand.to_string()))?;
            clauses.push(Clause { op, version });
        }

        Ok(Self { clauses })
    }
}

/// Check whether `version` satisfies the range `expression`.
///
/// Returns false when either the version or any clause of the expression
/// cannot be parsed.
pub fn matches(version: &str, expression: &str) -> bool {
    let Some(version) = parse_version(version) else {
        debug!("Unparseable version '{}'", version);
        return false;
    };

    match expression.parse::<Constraint>() {
        Ok(constraint) => constraint.satisfies(&version),
        Err(e) => {
            debug!("Rejecting constraint '{}': {}", expression, e);
            false
        }
    }
}
