use std::{fmt, future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use super::Result;

/// Performs one HTTP POST of a JSON body and returns the decoded JSON response body.
///
/// Implement this over whatever HTTP client the application already uses.
/// `endpoint` is the path or URL the client was configured with; resolving
/// it against a base URL is up to the implementation.
///
/// Errors raised by the HTTP client should be wrapped with [`Error::transport`](crate::Error::transport).
pub trait Transport {
    fn post(&self, endpoint: &str, body: Value) -> impl Future<Output = Result<Value>> + Send;

    fn shared(self) -> SharedTransport
    where
        Self: Sized + Send + Sync + 'static,
    {
        SharedTransport(Arc::new(self))
    }
}

/// Type-erased transport handle. Clones share the same underlying transport.
#[derive(Clone)]
pub struct SharedTransport(Arc<dyn DynTransport + Send + Sync + 'static>);

impl SharedTransport {
    pub fn new(transport: impl Transport + Send + Sync + 'static) -> Self {
        transport.shared()
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.0.dyn_post(endpoint, body).await
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl fmt::Debug for SharedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedTransport")
    }
}

trait DynTransport {
    fn dyn_post<'a>(
        &'a self,
        endpoint: &'a str,
        body: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>>;
}
impl<T: Transport> DynTransport for T {
    fn dyn_post<'a>(
        &'a self,
        endpoint: &'a str,
        body: Value,
    ) -> Pin<Box<dyn Future<Output = Result<Value>> + Send + 'a>> {
        Box::pin(self.post(endpoint, body))
    }
}
