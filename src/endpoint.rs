use url::Url;

use crate::{Error, Result};

pub const JSONRPC_PATH: &str = "jsonrpc";

/// Builds a server base URL, always ending in `/`.
///
/// ```
/// let url = odoocall::base_url("erp.example.com", Some(8069), false, Some("odoo")).unwrap();
/// assert_eq!(url, "http://erp.example.com:8069/odoo/");
/// ```
pub fn base_url(host: &str, port: Option<u16>, ssl: bool, base_path: Option<&str>) -> Result<String> {
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() || host.contains("://") {
        return Err(Error::invalid_arguments(format!(
            "host must be a bare host name, got {host:?}"
        )));
    }
    let scheme = if ssl { "https" } else { "http" };
    let port = port.map(|p| format!(":{p}")).unwrap_or_default();
    let path = base_path.unwrap_or("").trim_matches('/');
    let raw = if path.is_empty() {
        format!("{scheme}://{host}{port}/")
    } else {
        format!("{scheme}://{host}{port}/{path}/")
    };
    let url = Url::parse(&raw)
        .map_err(|e| Error::invalid_arguments(format!("invalid base url {raw:?}: {e}")))?;
    Ok(url.into())
}

/// Appends the JSON-RPC path to a base URL.
///
/// An empty base yields the relative path `jsonrpc`, for HTTP clients that
/// carry their own base URL.
pub fn jsonrpc_endpoint(base_url: &str) -> Result<String> {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return Ok(JSONRPC_PATH.to_string());
    }
    let mut base = Url::parse(base_url)
        .map_err(|e| Error::invalid_arguments(format!("invalid base url {base_url:?}: {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    let url = base
        .join(JSONRPC_PATH)
        .map_err(|e| Error::invalid_arguments(format!("cannot join {base}: {e}")))?;
    Ok(url.into())
}
