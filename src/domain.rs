//! Search domains.
//!
//! A domain is a prefix-notation list of logical operators and
//! `(field, operator, value)` terms. It is sent to the server as-is and never
//! evaluated or checked for arity on this side.

use std::fmt;

use parse_display::{Display, FromStr};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
pub enum LogicalOperator {
    #[display("!")]
    Not,
    #[display("|")]
    Or,
    #[display("&")]
    And,
}
impl LogicalOperator {
    pub fn arity(self) -> usize {
        match self {
            LogicalOperator::Not => 1,
            LogicalOperator::Or | LogicalOperator::And => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr)]
pub enum TermOperator {
    #[display("=")]
    Eq,
    #[display("!=")]
    Ne,
    #[display(">")]
    Gt,
    #[display(">=")]
    Ge,
    #[display("<")]
    Lt,
    #[display("<=")]
    Le,
    #[display("=?")]
    EqOrUnset,
    #[display("=like")]
    EqLike,
    #[display("like")]
    Like,
    #[display("not like")]
    NotLike,
    #[display("ilike")]
    ILike,
    #[display("not ilike")]
    NotILike,
    #[display("=ilike")]
    EqILike,
    #[display("in")]
    In,
    #[display("not in")]
    NotIn,
    #[display("child_of")]
    ChildOf,
    #[display("parent_of")]
    ParentOf,
}

macro_rules! serde_via_display {
    ($($ty:ty),*) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&s), &stringify!($ty)))
            }
        }
    )*};
}
serde_via_display!(LogicalOperator, TermOperator);

/// `(field, operator, value)`, serialized as a three element array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term(pub String, pub TermOperator, pub Value);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainItem {
    Operator(LogicalOperator),
    Term(Term),
    /// Anything else the caller wants passed through untouched.
    Raw(Value),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(Vec<DomainItem>);

impl Domain {
    /// The empty domain, matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, field: impl Into<String>, op: TermOperator, value: impl Into<Value>) -> Self {
        self.0.push(DomainItem::Term(Term(field.into(), op, value.into())));
        self
    }
    pub fn and(self) -> Self {
        self.op(LogicalOperator::And)
    }
    pub fn or(self) -> Self {
        self.op(LogicalOperator::Or)
    }
    pub fn not(self) -> Self {
        self.op(LogicalOperator::Not)
    }
    fn op(mut self, op: LogicalOperator) -> Self {
        self.0.push(DomainItem::Operator(op));
        self
    }
    pub fn raw(mut self, item: Value) -> Self {
        self.0.push(DomainItem::Raw(item));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn items(&self) -> &[DomainItem] {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(DomainItem::to_value).collect())
    }
}
impl DomainItem {
    fn to_value(&self) -> Value {
        match self {
            DomainItem::Operator(op) => Value::String(op.to_string()),
            DomainItem::Term(Term(field, op, value)) => {
                Value::Array(vec![field.clone().into(), op.to_string().into(), value.clone()])
            }
            DomainItem::Raw(v) => v.clone(),
        }
    }
}

impl From<Vec<DomainItem>> for Domain {
    fn from(items: Vec<DomainItem>) -> Self {
        Self(items)
    }
}
impl FromIterator<DomainItem> for Domain {
    fn from_iter<I: IntoIterator<Item = DomainItem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
