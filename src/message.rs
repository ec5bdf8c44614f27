use std::fmt;

use derive_ex::derive_ex;
use ordered_float::OrderedFloat;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::is_truthy;

use super::{Error, Result};


#[derive(Debug, Serialize, Deserialize, Clone)]
#[derive_ex(Eq, PartialEq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    Float(#[eq(key = OrderedFloat($))] f64),
    String(String),
}
impl RequestId {
    fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            RequestId::Float(f) if f.fract() == 0.0 && f.abs() <= i64::MAX as f64 => Some(*f as i64),
            RequestId::Float(_) | RequestId::String(_) => None,
        }
    }

    /// Numeric ids compare by value, so `7` and `7.0` match but `"7"` does not.
    pub fn matches(&self, other: &RequestId) -> bool {
        self == other || matches!((self.as_i64(), other.as_i64()), (Some(a), Some(b)) if a == b)
    }
}
impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Number(id)
    }
}

/// Remote service a call is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Common,
    Object,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallParams {
    pub service: Service,
    pub method: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub kwargs: Map<String, Value>,
}

/// Outgoing envelope. The JSON-RPC method is always `call`; the remote method lives in `params`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestMessage {
    pub jsonrpc: String,
    pub method: String,
    pub params: CallParams,
    pub id: RequestId,
}
impl RequestMessage {
    pub fn new(id: impl Into<RequestId>, params: CallParams) -> Self {
        RequestMessage {
            jsonrpc: "2.0".to_string(),
            method: "call".to_string(),
            params,
            id: id.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseMessage {
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::protocol(format!(
                "response is not a JSON object: {value}"
            )));
        }
        serde_json::from_value(value)
            .map_err(|e| Error::protocol(format!("malformed response envelope: {e}")))
    }

    pub(crate) fn into_result(self, expected: &RequestId) -> Result<Value> {
        if self.jsonrpc.as_deref() != Some("2.0") {
            return Err(Error::protocol(format!(
                "unsupported jsonrpc version {:?}",
                self.jsonrpc
            )));
        }
        match &self.id {
            Some(id) if id.matches(expected) => {}
            id => {
                return Err(Error::protocol(format!(
                    "response id {id:?} differs from request id {expected:?}"
                )));
            }
        }
        match (self.error, self.result) {
            (Some(error), _) if is_truthy(&error) => {
                Err(Error::RemoteFault(ErrorObject::from_value(error)))
            }
            (_, None) => Err(Error::protocol("response with no result")),
            (_, Some(result)) => Ok(result),
        }
    }
}

/// Error payload returned by the server, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
impl ErrorObject {
    fn from_value(value: Value) -> Self {
        match serde_json::from_value(value.clone()) {
            Ok(e) => e,
            Err(_) => ErrorObject {
                code: 0,
                message: "unstructured error".to_string(),
                data: Some(value),
            },
        }
    }

    fn data_str(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

/// `{:#}` also prints the server-side traceback when one was sent.
impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)?;
        match (self.data_str("name"), self.data_str("message")) {
            (Some(name), Some(message)) => write!(f, ": {name}: {message}")?,
            (None, Some(message)) => write!(f, ": {message}")?,
            (Some(name), None) => write!(f, ": {name}")?,
            (None, None) => {
                if let Some(data) = self.data.as_ref().filter(|d| !d.is_object()) {
                    write!(f, ": {data}")?;
                }
            }
        }
        if f.alternate() {
            if let Some(debug) = self.data_str("debug") {
                write!(f, "\n{debug}")?;
            }
        }
        Ok(())
    }
}
