use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    CallParams, Error, RequestId, RequestMessage, ResponseMessage, Result, Service,
    SharedTransport,
};

fn next_request_id() -> RequestId {
    RequestId::Number(rand::thread_rng().gen_range(0..=1_000_000_000))
}

/// Sends one JSON-RPC `call` and returns the validated `result` member.
///
/// Empty `args` and `kwargs` are left out of the envelope.
pub async fn call(
    transport: &SharedTransport,
    endpoint: &str,
    service: Service,
    method: &str,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
) -> Result<Value> {
    let request = RequestMessage::new(
        next_request_id(),
        CallParams {
            service,
            method: method.to_string(),
            args,
            kwargs,
        },
    );
    let id = request.id.clone();
    tracing::debug!(%service, method, ?id, endpoint, "sending call");
    let body = serde_json::to_value(&request)?;
    let response = transport.post(endpoint, body).await?;
    let result = ResponseMessage::from_value(response)?.into_result(&id);
    if let Err(e) = &result {
        tracing::debug!(%service, method, ?id, error = %e, "call failed");
    }
    result
}

/// Like [`call`], but the result must decode as `T`.
pub async fn call_as<T: DeserializeOwned>(
    transport: &SharedTransport,
    endpoint: &str,
    service: Service,
    method: &str,
    args: Vec<Value>,
    kwargs: Map<String, Value>,
) -> Result<T> {
    let value = call(transport, endpoint, service, method, args, kwargs).await?;
    serde_json::from_value(value).map_err(|e| {
        Error::protocol(format!("result of unexpected type for `{service}.{method}`: {e}"))
    })
}
