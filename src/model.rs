use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Product fields editable through the form, in display order.
pub const PRODUCT_KEYS: [&str; 7] = [
    "article_number",
    "name",
    "description",
    "specifiers",
    "stock",
    "location",
    "price",
];

static ID_ONLY: [&str; 1] = ["id"];
static ALL_FIELDS: [&str; 8] = [
    "article_number",
    "name",
    "description",
    "specifiers",
    "stock",
    "location",
    "price",
    "id",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperationMode {
    #[default]
    Read,
    Delete,
    Create,
    Update,
}

impl OperationMode {
    pub const ALL: [OperationMode; 4] = [
        OperationMode::Read,
        OperationMode::Delete,
        OperationMode::Create,
        OperationMode::Update,
    ];

    pub fn label(self) -> &'static str {
        match self {
            OperationMode::Read => "Read",
            OperationMode::Delete => "Delete",
            OperationMode::Create => "Create",
            OperationMode::Update => "Update",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            OperationMode::Read => "GET",
            OperationMode::Delete => "DELETE",
            OperationMode::Create => "POST",
            OperationMode::Update => "PUT",
        }
    }

    /// Which field keys the form shows for this mode.
    pub fn visible_fields(self) -> &'static [&'static str] {
        match self {
            OperationMode::Read | OperationMode::Delete => &ID_ONLY,
            OperationMode::Create => &PRODUCT_KEYS,
            OperationMode::Update => &ALL_FIELDS,
        }
    }

    pub fn next(self) -> OperationMode {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> OperationMode {
        let i = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Human label for a field key: "article_number" -> "Article number".
pub fn field_label(key: &str) -> String {
    if key == "id" {
        return "ID".to_string();
    }
    let spaced = key.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// One inventory row as returned by the API.
///
/// Ids arrive as numbers from some deployments and strings from others,
/// so deserialization accepts both and normalizes to a string.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Item {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub article_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub specifiers: Option<String>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

fn id_string<'de, D>(de: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = JsonValue::deserialize(de)?;
    if let Some(s) = v.as_str() {
        return Ok(s.to_string());
    }
    if let Some(n) = v.as_i64() {
        return Ok(n.to_string());
    }
    Ok(v.to_string())
}

impl Item {
    /// Text value for a field key, for form population and display.
    pub fn field(&self, key: &str) -> Option<String> {
        match key {
            "id" => Some(self.id.clone()),
            "article_number" => self.article_number.clone(),
            "name" => self.name.clone(),
            "description" => self.description.clone(),
            "specifiers" => self.specifiers.clone(),
            "stock" => self.stock.map(|n| n.to_string()),
            "location" => self.location.clone(),
            "price" => self.price.map(fmt_number),
            _ => None,
        }
    }
}

/// Format a float without a trailing ".0" when it is integral.
pub fn fmt_number(v: f64) -> String {
    if v.fract().abs() < f64::EPSILON {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub title: Option<String>,
}

fn default_base_url() -> String {
    "https://lager.emilfolino.se/v2".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            title: None,
        }
    }
}

pub(crate) fn validate_api_config(cfg: &ApiConfig) -> Result<(), String> {
    if cfg.base_url.is_empty() {
        return Err("base_url must not be empty".to_string());
    }
    if !(cfg.base_url.starts_with("http://") || cfg.base_url.starts_with("https://")) {
        return Err(format!(
            "base_url must start with http:// or https://: '{}'",
            cfg.base_url
        ));
    }
    Ok(())
}

/// Locate and parse the YAML config.
///
/// Order: LAGER_TUI_CONFIG env var, ./lager.yaml, ~/.lager/lager.yaml.
/// Missing files fall through to defaults; a present-but-broken file errors.
pub fn load_config() -> Result<ApiConfig> {
    let mut candidates: Vec<std::path::PathBuf> = Vec::new();
    if let Ok(p) = std::env::var("LAGER_TUI_CONFIG") {
        if !p.is_empty() {
            candidates.push(std::path::PathBuf::from(p));
        }
    }
    candidates.push(std::path::PathBuf::from("lager.yaml"));
    if let Ok(home) = std::env::var("HOME") {
        let mut p = std::path::PathBuf::from(home);
        p.push(".lager");
        p.push("lager.yaml");
        candidates.push(p);
    }

    for path in candidates {
        if !path.exists() {
            continue;
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let mut cfg: ApiConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        while cfg.base_url.ends_with('/') {
            cfg.base_url.pop();
        }
        if let Err(e) = validate_api_config(&cfg) {
            anyhow::bail!("invalid config {}: {}", path.display(), e);
        }
        return Ok(cfg);
    }
    Ok(ApiConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_cycle_wraps_both_ways() {
        assert_eq!(OperationMode::Read.next(), OperationMode::Delete);
        assert_eq!(OperationMode::Update.next(), OperationMode::Read);
        assert_eq!(OperationMode::Read.prev(), OperationMode::Update);
        assert_eq!(OperationMode::Create.prev(), OperationMode::Delete);
    }

    #[test]
    fn visible_fields_per_mode() {
        assert_eq!(OperationMode::Read.visible_fields(), &["id"]);
        assert_eq!(OperationMode::Delete.visible_fields(), &["id"]);
        assert_eq!(OperationMode::Create.visible_fields().len(), 7);
        assert!(!OperationMode::Create.visible_fields().contains(&"id"));
        let upd = OperationMode::Update.visible_fields();
        assert_eq!(upd.len(), 8);
        assert_eq!(*upd.last().unwrap(), "id");
    }

    #[test]
    fn field_labels_read_naturally() {
        assert_eq!(field_label("article_number"), "Article number");
        assert_eq!(field_label("id"), "ID");
        assert_eq!(field_label("price"), "Price");
    }

    #[test]
    fn item_id_accepts_numbers_and_strings() {
        let a: Item = serde_json::from_value(serde_json::json!({"id": 7})).unwrap();
        assert_eq!(a.id, "7");
        let b: Item = serde_json::from_value(serde_json::json!({"id": "7"})).unwrap();
        assert_eq!(b.id, "7");
    }

    #[test]
    fn item_field_formats_numbers() {
        let it = Item {
            id: "1".into(),
            stock: Some(12),
            price: Some(99.0),
            ..Default::default()
        };
        assert_eq!(it.field("stock").as_deref(), Some("12"));
        assert_eq!(it.field("price").as_deref(), Some("99"));
        assert_eq!(it.field("name"), None);
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let cfg = ApiConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        let err = validate_api_config(&cfg).unwrap_err();
        assert!(err.contains("http"));
        assert!(validate_api_config(&ApiConfig::default()).is_ok());
    }
}
