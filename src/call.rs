use serde::Serialize;
use serde_json::{Map, Value};

use crate::{Domain, Error, Result};

/// Keyword arguments of an `execute_kw` call.
///
/// Only options that are set are sent. The server distinguishes an omitted
/// option from an explicit default (no `fields` means every field, while
/// `fields: []` means only `id`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KwArgs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<bool>,
}
impl KwArgs {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn to_map(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            v => Err(Error::invalid_arguments(format!("kwargs must be an object, got {v}"))),
        }
    }
}

/// What a call operates on: the records matching a domain, or an explicit id list.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Domain(Domain),
    Ids(Vec<i64>),
}
impl Selector {
    /// Exactly one of `domain` and `ids` must be given.
    pub fn exactly_one(domain: Option<Domain>, ids: Option<Vec<i64>>) -> Result<Self> {
        match (domain, ids) {
            (Some(domain), None) => Ok(Selector::Domain(domain)),
            (None, Some(ids)) => Ok(Selector::Ids(ids)),
            (Some(_), Some(_)) => Err(Error::invalid_arguments(
                "both domain and ids were given; exactly one is required",
            )),
            (None, None) => Err(Error::invalid_arguments(
                "neither domain nor ids was given; exactly one is required",
            )),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Selector::Domain(d) => d.to_value(),
            Selector::Ids(ids) => Value::from(ids.clone()),
        }
    }
}

/// A generic `execute_kw` call on a model.
///
/// ```
/// use odoocall::{Domain, ExecuteKw, KwArgs};
///
/// let call = ExecuteKw::new("search")
///     .model("res.partner")
///     .domain(Domain::new())
///     .kwargs(KwArgs { limit: Some(5), ..KwArgs::default() });
/// assert_eq!(call.method, "search");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteKw {
    pub model_name: Option<String>,
    pub method: String,
    pub domain: Option<Domain>,
    pub ids: Option<Vec<i64>>,
    /// Positional arguments placed after the selector, such as the values of a `write`.
    pub extra_args: Vec<Value>,
    pub kwargs: KwArgs,
}

impl ExecuteKw {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }
    pub fn model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
    pub fn model_opt(mut self, model_name: Option<&str>) -> Self {
        self.model_name = model_name.map(str::to_string);
        self
    }
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain);
        self
    }
    pub fn ids(mut self, ids: impl Into<Vec<i64>>) -> Self {
        self.ids = Some(ids.into());
        self
    }
    pub fn arg(mut self, arg: Value) -> Self {
        self.extra_args.push(arg);
        self
    }
    pub fn kwargs(mut self, kwargs: KwArgs) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Builds the full positional argument list:
    /// `[database, uid, password, model, method, [selector, extra...], kwargs?]`.
    pub(crate) fn build_args(
        &self,
        database: &str,
        uid: i64,
        password: &str,
        model_name: &str,
    ) -> Result<Vec<Value>> {
        let selector = Selector::exactly_one(self.domain.clone(), self.ids.clone())?;
        let mut method_args = vec![selector.to_value()];
        method_args.extend(self.extra_args.iter().cloned());

        let mut args = vec![
            Value::from(database),
            Value::from(uid),
            Value::from(password),
            Value::from(model_name),
            Value::from(self.method.as_str()),
            Value::Array(method_args),
        ];
        if !self.kwargs.is_empty() {
            args.push(Value::Object(self.kwargs.to_map()?));
        }
        Ok(args)
    }
}
