use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::{
    Domain, Error, ExecuteKw, OdooClient, ReadOptions, Record, Result, SearchOptions, Transport,
};

/// Synchronous counterpart of [`Transport`], for HTTP clients without an async API.
///
/// Wrap it in [`FromBlocking`] to hand it to a client.
pub trait BlockingTransport {
    fn post(&self, endpoint: &str, body: Value) -> Result<Value>;
}

/// Adapts a [`BlockingTransport`] to [`Transport`].
///
/// The request runs on the thread polling the future, so this suits
/// [`BlockingOdooClient`] and current-thread runtimes.
#[derive(Debug, Clone)]
pub struct FromBlocking<T>(pub T);

impl<T: BlockingTransport + Sync> Transport for FromBlocking<T> {
    async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.0.post(endpoint, body)
    }
}

/// Synchronous wrapper around [`OdooClient`].
///
/// Each call is driven to completion on a private current-thread runtime.
/// Do not use it from inside an async context.
#[derive(Debug)]
pub struct BlockingOdooClient {
    inner: OdooClient,
    runtime: Arc<Runtime>,
}

impl BlockingOdooClient {
    pub fn new(inner: OdooClient) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::runtime)?;
        Ok(Self {
            inner,
            runtime: Arc::new(runtime),
        })
    }

    /// Builds a client over a synchronous HTTP client.
    ///
    /// `username` is exchanged for a uid by [`login`](Self::login).
    pub fn with_blocking_transport(
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        transport: impl BlockingTransport + Send + Sync + 'static,
    ) -> Result<Self> {
        Self::new(OdooClient::new(
            database,
            username.into(),
            password,
            FromBlocking(transport),
        ))
    }

    pub fn inner(&self) -> &OdooClient {
        &self.inner
    }
    pub fn into_inner(self) -> OdooClient {
        self.inner
    }

    /// See [`OdooClient::new_for_model`]. The runtime is shared.
    pub fn new_for_model(&self, model_name: impl Into<String>) -> Self {
        Self {
            inner: self.inner.new_for_model(model_name),
            runtime: self.runtime.clone(),
        }
    }

    pub fn login(&mut self) -> Result<Option<i64>> {
        self.runtime.block_on(self.inner.login())
    }
    pub fn force_login(&mut self) -> Result<i64> {
        self.runtime.block_on(self.inner.force_login())
    }
    pub fn execute_kw(&self, call: &ExecuteKw) -> Result<Value> {
        self.runtime.block_on(self.inner.execute_kw(call))
    }
    pub fn execute_kw_as<T: DeserializeOwned>(&self, call: &ExecuteKw) -> Result<T> {
        self.runtime.block_on(self.inner.execute_kw_as(call))
    }
    pub fn search(&self, domain: &Domain, options: &SearchOptions) -> Result<Vec<i64>> {
        self.runtime.block_on(self.inner.search(domain, options))
    }
    pub fn search_counted(&self, domain: &Domain, options: &SearchOptions) -> Result<i64> {
        self.runtime.block_on(self.inner.search_counted(domain, options))
    }
    pub fn search_count(&self, domain: &Domain, model_name: Option<&str>) -> Result<i64> {
        self.runtime.block_on(self.inner.search_count(domain, model_name))
    }
    pub fn search_read(&self, domain: &Domain, options: &ReadOptions) -> Result<Vec<Record>> {
        self.runtime.block_on(self.inner.search_read(domain, options))
    }
    pub fn read(&self, ids: Option<&[i64]>, options: &ReadOptions) -> Result<Vec<Record>> {
        self.runtime.block_on(self.inner.read(ids, options))
    }
    pub fn write(
        &self,
        ids: &[i64],
        values: &impl Serialize,
        model_name: Option<&str>,
    ) -> Result<bool> {
        self.runtime.block_on(self.inner.write(ids, values, model_name))
    }
}
