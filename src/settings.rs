/// Extension settings as stored in chrome.storage
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Account subdomain on the booking service (`<subdomain>.mocoapp.com`)
    pub subdomain: Option<String>,
    pub api_key: Option<String>,
    /// Extension version, sent along with API requests
    pub version: Option<String>,
    /// Organization or self-hosted origin of the project-management tool
    pub host_override: Option<String>,
}

impl Settings {
    pub fn from_js(value: JsValue) -> Result<Settings, serde_wasm_bindgen::Error> {
        if value.is_undefined() || value.is_null() {
            return Ok(Settings::default());
        }
        serde_wasm_bindgen::from_value(value)
    }

    /// True when the account cannot be reached: subdomain or API key is missing
    pub fn has_invalid_configuration(&self) -> bool {
        [&self.subdomain, &self.api_key]
            .iter()
            .any(|value| is_blank(value.as_deref()))
    }

    /// The configured host override, if it is not blank
    pub fn host_override(&self) -> Option<&str> {
        self.host_override
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
