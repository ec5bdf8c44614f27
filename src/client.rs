use std::fmt;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{
    Domain, Error, ExecuteKw, KwArgs, Record, RelationShape, Result, Service, SharedTransport,
    Transport, normalize, rpc, utils::is_truthy,
};

pub const DEFAULT_ENDPOINT: &str = "/jsonrpc";

/// Who the client authenticates as: a login name to exchange for a uid, or a uid already known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Username(String),
    Uid(i64),
}
impl From<&str> for Identity {
    fn from(username: &str) -> Self {
        Identity::Username(username.to_string())
    }
}
impl From<String> for Identity {
    fn from(username: String) -> Self {
        Identity::Username(username)
    }
}
impl From<i64> for Identity {
    fn from(uid: i64) -> Self {
        Identity::Uid(uid)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Overrides the client's bound model.
    pub model_name: Option<String>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub order: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Overrides the client's bound model.
    pub model_name: Option<String>,
    /// `None` fetches every field.
    pub fields: Option<Vec<String>>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
    pub order: Option<String>,
    /// Overrides the client's relation shape for this call.
    pub shape: Option<RelationShape>,
}
impl ReadOptions {
    pub fn fields<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            fields: Some(fields.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

pub struct ClientBuilder {
    database: String,
    identity: Identity,
    password: String,
    transport: Option<SharedTransport>,
    endpoint: String,
    model_name: Option<String>,
    shape: RelationShape,
}

impl ClientBuilder {
    pub fn transport(mut self, transport: impl Transport + Send + Sync + 'static) -> Self {
        self.transport = Some(transport.shared());
        self
    }
    pub fn shared_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }
    /// Path or URL handed to the transport on every call. Defaults to [`DEFAULT_ENDPOINT`].
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
    pub fn default_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }
    pub fn shape(mut self, shape: RelationShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn build(self) -> OdooClient {
        let (username, uid) = match self.identity {
            Identity::Username(username) => (Some(username), None),
            Identity::Uid(uid) => (None, Some(uid)),
        };
        OdooClient {
            database: self.database,
            username,
            uid,
            password: self.password,
            transport: self.transport,
            endpoint: self.endpoint,
            model_name: self.model_name,
            shape: self.shape,
        }
    }
}

/// Client for the `execute_kw` object API.
///
/// Every data call requires a uid, either given at construction or obtained
/// with [`login`](Self::login).
pub struct OdooClient {
    database: String,
    username: Option<String>,
    uid: Option<i64>,
    password: String,
    transport: Option<SharedTransport>,
    endpoint: String,
    model_name: Option<String>,
    shape: RelationShape,
}

impl fmt::Debug for OdooClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooClient")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("uid", &self.uid)
            .field("endpoint", &self.endpoint)
            .field("model_name", &self.model_name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

impl OdooClient {
    pub fn builder(
        database: impl Into<String>,
        identity: impl Into<Identity>,
        password: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder {
            database: database.into(),
            identity: identity.into(),
            password: password.into(),
            transport: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_name: None,
            shape: RelationShape::default(),
        }
    }

    pub fn new(
        database: impl Into<String>,
        identity: impl Into<Identity>,
        password: impl Into<String>,
        transport: impl Transport + Send + Sync + 'static,
    ) -> Self {
        Self::builder(database, identity, password)
            .transport(transport)
            .build()
    }

    /// Derives a client bound to `model_name`.
    ///
    /// The new client shares the database, credentials, endpoint and transport
    /// of `self`. Its bound model and relation shape are its own; `self` is left unchanged.
    pub fn new_for_model(&self, model_name: impl Into<String>) -> Self {
        OdooClient {
            database: self.database.clone(),
            username: self.username.clone(),
            uid: self.uid,
            password: self.password.clone(),
            transport: self.transport.clone(),
            endpoint: self.endpoint.clone(),
            model_name: Some(model_name.into()),
            shape: self.shape,
        }
    }

    pub fn set_transport(&mut self, transport: impl Transport + Send + Sync + 'static) {
        self.transport = Some(transport.shared());
    }
    pub fn set_shape(&mut self, shape: RelationShape) {
        self.shape = shape;
    }

    pub fn database(&self) -> &str {
        &self.database
    }
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
    pub fn uid(&self) -> Option<i64> {
        self.uid
    }
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
    pub fn model_name(&self) -> Option<&str> {
        self.model_name.as_deref()
    }
    pub fn shape(&self) -> RelationShape {
        self.shape
    }
    pub fn transport(&self) -> Option<&SharedTransport> {
        self.transport.as_ref()
    }

    fn require_transport(&self) -> Result<&SharedTransport> {
        self.transport
            .as_ref()
            .ok_or_else(|| Error::precondition("no transport has been set"))
    }
    fn require_uid(&self) -> Result<i64> {
        self.uid
            .ok_or_else(|| Error::precondition("uid has not been set (did you forget to login?)"))
    }
    fn resolve_model<'a>(&'a self, model_name: Option<&'a str>) -> Result<&'a str> {
        model_name.or(self.model_name.as_deref()).ok_or_else(|| {
            Error::precondition(
                "model name has not been set; bind a default model or pass one with the call",
            )
        })
    }

    /// Exchanges the username for a uid.
    ///
    /// Returns `Ok(None)` without contacting the server when a uid is already known.
    pub async fn login(&mut self) -> Result<Option<i64>> {
        if self.uid.is_some() {
            return Ok(None);
        }
        self.force_login().await.map(Some)
    }

    /// Logs in again even if a uid is already known.
    pub async fn force_login(&mut self) -> Result<i64> {
        let transport = self.require_transport()?;
        let Some(username) = self.username.as_deref() else {
            return Err(Error::precondition("login was invoked but no username is set"));
        };
        let args = vec![
            Value::from(self.database.as_str()),
            Value::from(username),
            Value::from(self.password.as_str()),
        ];
        let result = rpc::call(transport, &self.endpoint, Service::Common, "login", args, Map::new()).await?;
        let Some(uid) = result.as_i64() else {
            return Err(Error::protocol(format!(
                "login for {username:?} on {:?} did not return a uid (got {result}); check the credentials",
                self.database
            )));
        };
        tracing::debug!(database = %self.database, username, uid, "logged in");
        self.uid = Some(uid);
        Ok(uid)
    }

    /// Generic `execute_kw` dispatch. Exactly one of `call.domain` and `call.ids` must be set.
    pub async fn execute_kw(&self, call: &ExecuteKw) -> Result<Value> {
        let (transport, args) = self.prepare(call)?;
        rpc::call(transport, &self.endpoint, Service::Object, "execute_kw", args, Map::new()).await
    }

    /// Like [`execute_kw`](Self::execute_kw), but the result must decode as `T`.
    pub async fn execute_kw_as<T: DeserializeOwned>(&self, call: &ExecuteKw) -> Result<T> {
        let (transport, args) = self.prepare(call)?;
        rpc::call_as(transport, &self.endpoint, Service::Object, "execute_kw", args, Map::new()).await
    }

    fn prepare(&self, call: &ExecuteKw) -> Result<(&SharedTransport, Vec<Value>)> {
        let transport = self.require_transport()?;
        let uid = self.require_uid()?;
        let model_name = self.resolve_model(call.model_name.as_deref())?;
        let args = call.build_args(&self.database, uid, &self.password, model_name)?;
        Ok((transport, args))
    }

    pub async fn search(&self, domain: &Domain, options: &SearchOptions) -> Result<Vec<i64>> {
        self.execute_kw_as(&search_call(domain, options, None)).await
    }

    /// `search` with `count` set: the number of matching records, honoring offset and limit.
    pub async fn search_counted(&self, domain: &Domain, options: &SearchOptions) -> Result<i64> {
        self.execute_kw_as(&search_call(domain, options, Some(true))).await
    }

    pub async fn search_count(&self, domain: &Domain, model_name: Option<&str>) -> Result<i64> {
        let call = ExecuteKw::new("search_count")
            .model_opt(model_name)
            .domain(domain.clone());
        self.execute_kw_as(&call).await
    }

    pub async fn search_read(&self, domain: &Domain, options: &ReadOptions) -> Result<Vec<Record>> {
        let call = ExecuteKw::new("search_read")
            .model_opt(options.model_name.as_deref())
            .domain(domain.clone())
            .kwargs(KwArgs {
                fields: options.fields.clone(),
                offset: options.offset,
                limit: options.limit,
                order: options.order.clone(),
                count: None,
            });
        let records = self.execute_kw_as(&call).await?;
        Ok(self.finish(records, options))
    }

    /// Reads records by id.
    ///
    /// `ids: None` reads every record of the model, as `search_read` with an
    /// empty domain. An empty id list returns nothing without a call.
    /// `offset` and `limit` are applied to the id list before sending.
    pub async fn read(&self, ids: Option<&[i64]>, options: &ReadOptions) -> Result<Vec<Record>> {
        let Some(ids) = ids else {
            return self.search_read(&Domain::new(), options).await;
        };
        let Some(ids) = page(ids, options.offset, options.limit) else {
            return Ok(Vec::new());
        };
        let call = ExecuteKw::new("read")
            .model_opt(options.model_name.as_deref())
            .ids(ids)
            .kwargs(KwArgs {
                fields: options.fields.clone(),
                ..KwArgs::default()
            });
        let records = self.execute_kw_as(&call).await?;
        Ok(self.finish(records, options))
    }

    /// Writes `values` to the records `ids`. Returns the truthiness of the server's acknowledgement.
    pub async fn write(
        &self,
        ids: &[i64],
        values: &impl Serialize,
        model_name: Option<&str>,
    ) -> Result<bool> {
        let call = ExecuteKw::new("write")
            .model_opt(model_name)
            .ids(ids)
            .arg(serde_json::to_value(values)?);
        Ok(is_truthy(&self.execute_kw(&call).await?))
    }

    fn finish(&self, mut records: Vec<Record>, options: &ReadOptions) -> Vec<Record> {
        let shape = options.shape.unwrap_or(self.shape);
        normalize(&mut records, options.fields.as_deref(), shape);
        records
    }
}

fn search_call(domain: &Domain, options: &SearchOptions, count: Option<bool>) -> ExecuteKw {
    ExecuteKw::new("search")
        .model_opt(options.model_name.as_deref())
        .domain(domain.clone())
        .kwargs(KwArgs {
            offset: options.offset,
            limit: options.limit,
            order: options.order.clone(),
            count,
            ..KwArgs::default()
        })
}

/// Applies offset and limit to an explicit id list. `None` means nothing is left to read.
///
/// A limit of zero means no limit, as it does on the server.
fn page(ids: &[i64], offset: Option<u64>, limit: Option<u64>) -> Option<Vec<i64>> {
    let offset = usize::try_from(offset.unwrap_or(0)).unwrap_or(usize::MAX);
    if ids.is_empty() || offset >= ids.len() {
        return None;
    }
    let ids = &ids[offset..];
    let len = match limit {
        Some(limit) if limit > 0 => usize::try_from(limit).unwrap_or(usize::MAX).min(ids.len()),
        _ => ids.len(),
    };
    Some(ids[..len].to_vec())
}
