//! # odoocall
//!
//! A small asynchronous client for the JSON-RPC object API of Odoo servers.
//!
//! The client builds `execute_kw` calls for the usual verbs (`search`,
//! `search_count`, `search_read`, `read`, `write`), sends them through a
//! [`Transport`] supplied by the application, validates the JSON-RPC
//! response, and can reshape relational `*_id` fields of the returned
//! records.
//!
//! ```
//! use odoocall::{Domain, OdooClient, ReadOptions, RelationShape, Result, TermOperator, Transport};
//! use serde_json::Value;
//!
//! struct Http;
//! impl Transport for Http {
//!     async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
//!         // POST `body` to `endpoint` with your HTTP client and return the decoded body.
//!         # let _ = (endpoint, body);
//!         # unimplemented!()
//!     }
//! }
//!
//! async fn large_orders() -> Result<()> {
//!     let mut odoo = OdooClient::builder("mydb", "admin", "admin")
//!         .transport(Http)
//!         .endpoint("https://erp.example.com/jsonrpc")
//!         .build();
//!     odoo.login().await?;
//!
//!     let orders = odoo.new_for_model("sale.order");
//!     let records = orders
//!         .search_read(
//!             &Domain::new().term("amount_total", TermOperator::Gt, 10000),
//!             &ReadOptions {
//!                 shape: Some(RelationShape::AsInt),
//!                 ..ReadOptions::fields(["partner_id", "amount_total", "date_order"])
//!             },
//!         )
//!         .await?;
//!     for r in records {
//!         println!("{} -> partner {}", r["id"], r["partner_id"]);
//!     }
//!     Ok(())
//! }
//! ```

mod blocking;
mod call;
mod client;
mod domain;
mod endpoint;
mod error;
mod message;
mod normalize;
pub mod rpc;
mod transport;
mod utils;

pub use blocking::*;
pub use call::*;
pub use client::*;
pub use domain::*;
pub use endpoint::*;
pub use error::*;
pub use message::*;
pub use normalize::*;
pub use transport::*;
