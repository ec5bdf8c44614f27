#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard},
};

use assert_call::call;
use odoocall::{Record, Result, Transport};
use serde_json::{Map, Value, json};

pub const DB: &str = "demo";
pub const LOGIN: &str = "admin";
pub const PASSWORD: &str = "secret";
pub const UID: i64 = 2;

/// What the server does with the next responses.
#[derive(Clone, Debug)]
pub enum Mode {
    Normal,
    WrongId,
    NullResult,
    Result(Value),
    Error(Value),
}

struct State {
    models: BTreeMap<String, Vec<Record>>,
    requests: Vec<Value>,
    mode: Mode,
}

/// In-memory stand-in for the server, answering `common.login` and a few `object.execute_kw` methods.
#[derive(Clone)]
pub struct FakeServer(Arc<Mutex<State>>);

impl FakeServer {
    pub fn new() -> Self {
        let orders: Vec<Record> = serde_json::from_value(json!([
            {"id": 1, "name": "S00001", "state": "sale", "amount_total": 15000.0, "partner_id": [7, "Azure Interior"], "user_id": [2, "Mitchell Admin"]},
            {"id": 2, "name": "S00002", "state": "draft", "amount_total": 120.5, "partner_id": [8, "Deco Addict"], "user_id": false},
            {"id": 3, "name": "S00003", "state": "sale", "amount_total": 980.0, "partner_id": [7, "Azure Interior"], "user_id": [2, "Mitchell Admin"]},
            {"id": 4, "name": "S00004", "state": "sale", "amount_total": 22000.0, "partner_id": [9, "Gemini Furniture"], "user_id": false},
        ]))
        .unwrap();
        let partners: Vec<Record> = serde_json::from_value(json!([
            {"id": 7, "name": "Azure Interior", "parent_id": false},
            {"id": 8, "name": "Deco Addict", "parent_id": false},
            {"id": 9, "name": "Gemini Furniture", "parent_id": [7, "Azure Interior"]},
        ]))
        .unwrap();
        let mut models = BTreeMap::new();
        models.insert("sale.order".to_string(), orders);
        models.insert("res.partner".to_string(), partners);
        Self(Arc::new(Mutex::new(State {
            models,
            requests: Vec::new(),
            mode: Mode::Normal,
        })))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    pub fn set_mode(&self, mode: Mode) {
        self.lock().mode = mode;
    }
    pub fn requests(&self) -> Vec<Value> {
        self.lock().requests.clone()
    }
    pub fn post_count(&self) -> usize {
        self.lock().requests.len()
    }
    pub fn last_args(&self) -> Value {
        self.lock().requests.last().unwrap()["params"]["args"].clone()
    }
    pub fn records(&self, model: &str) -> Vec<Record> {
        self.lock().models[model].clone()
    }

    pub fn respond(&self, body: &Value) -> Value {
        let mut state = self.lock();
        state.requests.push(body.clone());
        let id = body["id"].clone();
        let outcome = match state.mode.clone() {
            Mode::Normal => dispatch(&mut state.models, &body["params"]),
            Mode::WrongId => return json!({"jsonrpc": "2.0", "id": id.as_i64().unwrap() + 1, "result": 1}),
            Mode::NullResult => Ok(Value::Null),
            Mode::Result(v) => Ok(v),
            Mode::Error(e) => Err(e),
        };
        match outcome {
            Ok(result) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
            Err(error) => json!({"jsonrpc": "2.0", "id": id, "error": error}),
        }
    }
}

impl Transport for FakeServer {
    async fn post(&self, _endpoint: &str, body: Value) -> Result<Value> {
        Ok(self.respond(&body))
    }
}

/// Forwards to a [`FakeServer`], recording each request with `call!`.
///
/// Only usable while a `CallRecorder` is active.
#[derive(Clone)]
pub struct Recorded(pub FakeServer);

impl Transport for Recorded {
    async fn post(&self, endpoint: &str, body: Value) -> Result<Value> {
        let params = &body["params"];
        match params["method"].as_str() {
            Some("execute_kw") => {
                call!(
                    "{endpoint} object.execute_kw {} {}",
                    params["args"][3].as_str().unwrap_or("?"),
                    params["args"][4].as_str().unwrap_or("?")
                );
            }
            method => {
                call!(
                    "{endpoint} {}.{}",
                    params["service"].as_str().unwrap_or("?"),
                    method.unwrap_or("?")
                );
            }
        }
        Ok(self.0.respond(&body))
    }
}

fn fault(message: &str) -> Value {
    json!({
        "code": 200,
        "message": "Odoo Server Error",
        "data": {"name": "odoo.exceptions.UserError", "message": message, "debug": "Traceback ..."}
    })
}

fn dispatch(models: &mut BTreeMap<String, Vec<Record>>, params: &Value) -> Result<Value, Value> {
    let args = params["args"].as_array().cloned().unwrap_or_default();
    match (params["service"].as_str(), params["method"].as_str()) {
        (Some("common"), Some("login")) => {
            if args == [json!(DB), json!(LOGIN), json!(PASSWORD)] {
                Ok(json!(UID))
            } else {
                Ok(json!(false))
            }
        }
        (Some("object"), Some("execute_kw")) => {
            if args.len() < 6 || args[..3] != [json!(DB), json!(UID), json!(PASSWORD)] {
                return Err(fault("Access Denied"));
            }
            let model = args[3].as_str().unwrap_or_default();
            let Some(records) = models.get_mut(model) else {
                return Err(fault(&format!("Object {model} doesn't exist")));
            };
            let method = args[4].as_str().unwrap_or_default();
            let margs = args[5].as_array().cloned().unwrap_or_default();
            let kwargs = args.get(6).and_then(Value::as_object).cloned().unwrap_or_default();
            execute(records, method, &margs, &kwargs)
        }
        _ => Err(fault("unknown service")),
    }
}

fn execute(
    records: &mut [Record],
    method: &str,
    margs: &[Value],
    kwargs: &Map<String, Value>,
) -> Result<Value, Value> {
    let offset = kwargs.get("offset").and_then(Value::as_u64).unwrap_or(0) as usize;
    let limit = kwargs.get("limit").and_then(Value::as_u64).map(|l| l as usize);
    let fields = kwargs.get("fields").and_then(Value::as_array).cloned();
    match method {
        "search" | "search_count" | "search_read" => {
            let domain = margs.first().and_then(Value::as_array).cloned().unwrap_or_default();
            let mut found: Vec<&Record> = records.iter().filter(|r| matches(r, &domain)).collect();
            found = found.into_iter().skip(offset).collect();
            if let Some(limit) = limit {
                found.truncate(limit);
            }
            match method {
                "search_count" => Ok(json!(found.len())),
                "search" if kwargs.get("count") == Some(&json!(true)) => Ok(json!(found.len())),
                "search" => Ok(json!(found.iter().map(|r| r["id"].clone()).collect::<Vec<_>>())),
                _ => Ok(Value::Array(found.into_iter().map(|r| project(r, &fields)).collect())),
            }
        }
        "read" => {
            let ids = margs.first().and_then(Value::as_array).cloned().unwrap_or_default();
            Ok(Value::Array(
                ids.iter()
                    .filter_map(|id| records.iter().find(|r| &r["id"] == id))
                    .map(|r| project(r, &fields))
                    .collect(),
            ))
        }
        "write" => {
            let ids = margs.first().and_then(Value::as_array).cloned().unwrap_or_default();
            let values = margs.get(1).and_then(Value::as_object).cloned().unwrap_or_default();
            for r in records.iter_mut().filter(|r| ids.contains(&r["id"])) {
                r.extend(values.clone());
            }
            Ok(json!(true))
        }
        _ => Err(fault(&format!("method {method} not supported"))),
    }
}

/// Implicit-AND of `=` and `>` terms; operators are ignored.
fn matches(record: &Record, domain: &[Value]) -> bool {
    domain.iter().all(|item| {
        let Some([field, op, value]) = item.as_array().map(Vec::as_slice) else {
            return true;
        };
        let actual = record.get(field.as_str().unwrap_or_default()).unwrap_or(&Value::Null);
        match op.as_str() {
            Some("=") => actual == value,
            Some(">") => actual.as_f64().zip(value.as_f64()).is_some_and(|(a, b)| a > b),
            _ => true,
        }
    })
}

fn project(record: &Record, fields: &Option<Vec<Value>>) -> Value {
    let Some(fields) = fields else {
        return Value::Object(record.clone());
    };
    let mut out = Map::new();
    out.insert("id".to_string(), record["id"].clone());
    for f in fields.iter().filter_map(Value::as_str) {
        if let Some(v) = record.get(f) {
            out.insert(f.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

pub fn logged_in_client(server: &FakeServer) -> odoocall::OdooClient {
    odoocall::OdooClient::new(DB, UID, PASSWORD, server.clone())
}
