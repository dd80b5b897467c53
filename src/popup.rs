/// Props for the booking popup frame
///
/// The popup page runs in its own frame and receives the matched service and
/// the settings as JSON-encoded query parameters.
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::resolver::ServiceMatch;
use crate::settings::Settings;

pub const POPUP_PAGE: &str = "popup.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopupSize {
    pub width: u32,
    pub height: u32,
}

impl PopupSize {
    /// The unauthorized state shows the settings hint and needs more room
    pub fn for_state(unauthorized: bool) -> PopupSize {
        PopupSize {
            width: 536,
            height: if unauthorized { 890 } else { 400 },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PopupQueryError {
    #[error("missing popup parameter {0:?}")]
    Missing(&'static str),

    #[error("invalid popup parameter {name:?}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Query string for the popup page: `service=<json>&settings=<json>`
pub fn popup_query(service: &ServiceMatch, settings: &Settings) -> Result<String, serde_json::Error> {
    Ok(form_urlencoded::Serializer::new(String::new())
        .append_pair("service", &serde_json::to_string(service)?)
        .append_pair("settings", &serde_json::to_string(settings)?)
        .finish())
}

/// Relative URL of the popup page with its props attached
pub fn popup_url(service: &ServiceMatch, settings: &Settings) -> Result<String, serde_json::Error> {
    Ok(format!("{}?{}", POPUP_PAGE, popup_query(service, settings)?))
}

pub fn parse_popup_query(query: &str) -> Result<(ServiceMatch, Settings), PopupQueryError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    Ok((param(query, "service")?, param(query, "settings")?))
}

fn param<T: DeserializeOwned>(query: &str, name: &'static str) -> Result<T, PopupQueryError> {
    let (_, raw) = form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .ok_or(PopupQueryError::Missing(name))?;
    serde_json::from_str(&raw).map_err(|source| PopupQueryError::Invalid { name, source })
}
