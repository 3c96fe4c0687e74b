use std::convert::TryFrom;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A single parameter value: text or a number. Integers are kept apart from floats so they keep
/// every digit.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(untagged, from = "RawScalar")]
pub enum Scalar {
    Int(i64),
    /// Finite floats, rendered without a trailing `.0` when integral
    Num(f64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Int(i64),
    Num(f64),
    Str(String),
}

impl From<RawScalar> for Scalar {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Int(n) => Scalar::Int(n),
            RawScalar::Num(n) => n.into(),
            RawScalar::Str(s) => Scalar::Str(s),
        }
    }
}

impl Scalar {
    /// The text of this scalar, numbers have none
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            Scalar::Int(_) | Scalar::Num(_) => None,
        }
    }
}

fn same_number(i: i64, n: f64) -> bool {
    n.fract() == 0.0 && i as f64 == n && n as i64 == i
}

// NaN equals itself so a repeatable name never holds it twice.
impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::Num(a), Scalar::Num(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::Int(i), Scalar::Num(n)) | (Scalar::Num(n), Scalar::Int(i)) => same_number(*i, *n),
            (Scalar::Str(a), Scalar::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => f.write_str(s),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Num(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl From<&String> for Scalar {
    fn from(s: &String) -> Self {
        Scalar::Str(s.clone())
    }
}

/// `NaN` and the infinities become the text they render as
impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        if n.is_nan() {
            Scalar::Str("NaN".to_string())
        } else if n.is_infinite() {
            Scalar::Str(if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
        } else {
            Scalar::Num(n)
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::Int(i64::from(n))
    }
}

impl From<u32> for Scalar {
    fn from(n: u32) -> Self {
        Scalar::Int(i64::from(n))
    }
}

impl From<u64> for Scalar {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or_else(|_| Scalar::Str(n.to_string()), Scalar::Int)
    }
}

impl From<usize> for Scalar {
    fn from(n: usize) -> Self {
        Scalar::from(n as u64)
    }
}

/// What a [`crate::Parameter`] holds: one scalar or a flat list of them. Lists go over the wire
/// joined with `,`, which is how Solr reads parameters like `fl`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// A single string or number
    Scalar(Scalar),
    /// An ordered list of scalars
    List(Vec<Scalar>),
}

impl Value {
    /// Empty strings and empty lists are empty, `0` is not
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(Scalar::Str(s)) => s.is_empty(),
            Value::Scalar(Scalar::Int(_)) | Value::Scalar(Scalar::Num(_)) => false,
            Value::List(list) => list.is_empty(),
        }
    }

    /// The text of a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => s.as_str(),
            Value::List(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            Value::List(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(s) => s.fmt(f),
            Value::List(list) => {
                for (i, s) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    s.fmt(f)?;
                }
                Ok(())
            }
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Value::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Scalar(n.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Value {
    fn from(list: Vec<T>) -> Self {
        Value::List(list.into_iter().map(Into::into).collect())
    }
}

/// What to look for when searching a store by value: an exact [`Value`] or a regular expression
/// that has to match somewhere in a stored scalar.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Strict equality, `"10"` and `10` are different values and lists compare positionally
    Exact(Value),
    /// Tested against the rendered text of a stored scalar, never against a list
    Regex(Regex),
}

impl Pattern {
    /// Compile a regular expression pattern
    pub fn regex(re: &str) -> Result<Self> {
        Ok(Pattern::Regex(Regex::new(re)?))
    }

    /// Whether a stored value satisfies this pattern
    pub fn matches(&self, stored: &Value) -> bool {
        match self {
            Pattern::Exact(v) => v == stored,
            Pattern::Regex(re) => stored.as_scalar().map_or(false, |s| re.is_match(&s.to_string())),
        }
    }
}

impl From<Value> for Pattern {
    fn from(v: Value) -> Self {
        Pattern::Exact(v)
    }
}

impl From<&Value> for Pattern {
    fn from(v: &Value) -> Self {
        Pattern::Exact(v.clone())
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Self {
        Pattern::Regex(re)
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        Pattern::Exact(s.into())
    }
}

impl From<String> for Pattern {
    fn from(s: String) -> Self {
        Pattern::Exact(s.into())
    }
}

impl From<f64> for Pattern {
    fn from(n: f64) -> Self {
        Pattern::Exact(n.into())
    }
}

impl From<i64> for Pattern {
    fn from(n: i64) -> Self {
        Pattern::Exact(n.into())
    }
}

impl From<i32> for Pattern {
    fn from(n: i32) -> Self {
        Pattern::Exact(n.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for Pattern {
    fn from(list: Vec<T>) -> Self {
        Pattern::Exact(list.into())
    }
}
