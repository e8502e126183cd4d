use std::sync::mpsc::Sender;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::model::{ApiConfig, Item, OperationMode};

/// Characters left intact by form encoding: alphanumerics plus
/// `- _ . ! ~ * ' ( )`, matching what the server's other clients send.
const FORM_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, FORM_SAFE).to_string()
}

/// Encode key/value pairs as an x-www-form-urlencoded body.
pub fn encode_form(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A fully prepared request: read goes out as a bodyless GET with query
/// params, every other mode posts a form body to the collection URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub mode: OperationMode,
    pub url: String,
    pub body: Option<String>,
}

pub fn build_submit_request(
    cfg: &ApiConfig,
    mode: OperationMode,
    fields: &[(String, String)],
) -> ApiRequest {
    match mode {
        OperationMode::Read => {
            let id = fields
                .iter()
                .find(|(k, _)| k == "id")
                .map(|(_, v)| v.as_str())
                .unwrap_or("");
            ApiRequest {
                mode,
                url: format!(
                    "{}/products/{}?api_key={}",
                    cfg.base_url,
                    encode_component(id),
                    encode_component(&cfg.api_key)
                ),
                body: None,
            }
        }
        _ => {
            let mut pairs: Vec<(String, String)> = fields.to_vec();
            pairs.push(("api_key".to_string(), cfg.api_key.clone()));
            ApiRequest {
                mode,
                url: format!("{}/products", cfg.base_url),
                body: Some(encode_form(&pairs)),
            }
        }
    }
}

/// Messages sent back from worker threads to the UI loop.
#[derive(Debug)]
pub enum ApiEvent {
    ListLoaded {
        seq: u64,
        outcome: Result<Vec<Item>, String>,
    },
    SubmitDone {
        mode: OperationMode,
        id: String,
        outcome: Result<Option<JsonValue>, String>,
    },
}

fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("lager-tui/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")
}

#[derive(Deserialize)]
struct ProductsEnvelope {
    #[serde(default)]
    data: Vec<Item>,
}

fn fetch_products(cfg: &ApiConfig) -> Result<Vec<Item>> {
    let client = http_client()?;
    let url = format!(
        "{}/products?api_key={}",
        cfg.base_url,
        encode_component(&cfg.api_key)
    );
    let response = client
        .get(&url)
        .send()
        .with_context(|| format!("failed to reach {}", cfg.base_url))?;
    if !response.status().is_success() {
        bail!("stock list request failed (status: {})", response.status());
    }
    let envelope: ProductsEnvelope = response
        .json()
        .context("failed to parse stock list response")?;
    Ok(envelope.data)
}

/// Fetch the stock list on a background thread; the result arrives on `tx`
/// tagged with `seq` so superseded fetches can be discarded.
pub fn spawn_fetch_products(cfg: ApiConfig, seq: u64, tx: Sender<ApiEvent>) {
    std::thread::spawn(move || {
        let outcome = fetch_products(&cfg).map_err(|e| format!("{e:#}"));
        let _ = tx.send(ApiEvent::ListLoaded { seq, outcome });
    });
}

fn send_submit(cfg: &ApiConfig, req: &ApiRequest) -> Result<Option<JsonValue>> {
    let client = http_client()?;
    let builder = match req.mode {
        OperationMode::Read => client.get(&req.url),
        OperationMode::Delete => client.delete(&req.url),
        OperationMode::Create => client.post(&req.url),
        OperationMode::Update => client.put(&req.url),
    };
    let builder = match &req.body {
        Some(body) => builder
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body.clone()),
        None => builder,
    };
    let response = builder
        .send()
        .with_context(|| format!("failed to reach {}", cfg.base_url))?;
    let text = response.text().context("failed to read response body")?;
    Ok(extract_data(&text))
}

/// Run a prepared request on a background thread and report on `tx`.
pub fn spawn_submit(cfg: ApiConfig, req: ApiRequest, id: String, tx: Sender<ApiEvent>) {
    std::thread::spawn(move || {
        let outcome = send_submit(&cfg, &req).map_err(|e| format!("{e:#}"));
        let _ = tx.send(ApiEvent::SubmitDone {
            mode: req.mode,
            id,
            outcome,
        });
    });
}

/// Pull the `data` payload out of a response body, if any.
fn extract_data(body: &str) -> Option<JsonValue> {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|mut v| v.get_mut("data").map(JsonValue::take))
}

fn is_empty_payload(data: Option<&JsonValue>) -> bool {
    match data {
        None | Some(JsonValue::Null) => true,
        Some(JsonValue::Object(m)) => m.is_empty(),
        Some(JsonValue::Array(a)) => a.is_empty(),
        _ => false,
    }
}

fn scalar_text(v: &JsonValue) -> String {
    match v.as_str() {
        Some(s) => s.to_string(),
        None => v.to_string(),
    }
}

fn format_item(v: &JsonValue) -> String {
    match v {
        JsonValue::Object(m) => m
            .iter()
            .map(|(k, val)| format!("{}: {}", k, scalar_text(val)))
            .collect::<Vec<_>>()
            .join("\n"),
        other => scalar_text(other),
    }
}

/// Turn a submit response payload into the result pane text.
///
/// An empty payload is acknowledged with a one-line label: reads report
/// that nothing was found, updates say "Edited", every other mode says
/// "Deleted". Object payloads render one `key: value` line per entry in
/// payload order; array payloads render each element as its own block
/// separated by a blank line.
pub fn summarize(mode: OperationMode, id: &str, data: Option<&JsonValue>) -> String {
    if let Some(value) = data {
        if !is_empty_payload(Some(value)) {
            return match value {
                JsonValue::Array(items) => items
                    .iter()
                    .map(format_item)
                    .collect::<Vec<_>>()
                    .join("\n\n"),
                other => format_item(other),
            };
        }
    }
    match mode {
        OperationMode::Read => format!("No item found by ID {}.", id),
        OperationMode::Update => format!("Edited item by ID {}.", id),
        _ => format!("Deleted item by ID {}.", id),
    }
}
