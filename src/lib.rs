/// MOCO Bubble - time booking on project-management pages
/// Built with Rust + WASM

pub mod dom;
pub mod error;
pub mod extract;
pub mod html;
pub mod options;
pub mod pattern;
pub mod popup;
pub mod resolver;
pub mod services;
pub mod settings;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::dom::WebDocument;
use crate::options::{OptionGroup, Project, ProjectOption};
use crate::pattern::Params;
use crate::popup::PopupSize;
use crate::resolver::ServiceMatch;
use crate::settings::Settings;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

#[derive(Serialize)]
struct UrlMatch<'a> {
    name: &'a str,
    host: &'a str,
    params: &'a Params,
}

/// Service name, host and parameters for `url`, or `null` if no service
/// handles it
#[wasm_bindgen]
pub fn match_url(url: &str, host_override: Option<String>) -> Result<JsValue, JsValue> {
    match resolver::resolve(url, host_override.as_deref()) {
        Some(resolution) => to_js(&UrlMatch {
            name: resolution.service.name,
            host: &resolution.host,
            params: &resolution.params,
        }),
        None => Ok(JsValue::NULL),
    }
}

/// Match the current tab against the supported services and read the
/// booking fields from its document. Returns `null` on unsupported pages.
#[wasm_bindgen]
pub fn match_current_page(settings: JsValue) -> Result<JsValue, JsValue> {
    let settings = Settings::from_js(settings).map_err(js_error)?;
    let window = web_sys::window().ok_or_else(|| js_error("no global window"))?;
    let url = window.location().href()?;
    let document = WebDocument::current().ok_or_else(|| js_error("no document"))?;

    match resolver::resolver_for(settings.host_override()).match_page(&url, &document) {
        Some(service_match) => to_js(&service_match),
        None => Ok(JsValue::NULL),
    }
}

/// Whether the popup should show the settings hint instead of the form
#[wasm_bindgen]
pub fn has_invalid_configuration(settings: JsValue) -> Result<bool, JsValue> {
    let settings = Settings::from_js(settings).map_err(js_error)?;
    Ok(settings.has_invalid_configuration())
}

/// URL of the popup page for a match returned by `match_current_page`
#[wasm_bindgen]
pub fn popup_url(service: JsValue, settings: JsValue) -> Result<String, JsValue> {
    let service: ServiceMatch = serde_wasm_bindgen::from_value(service).map_err(js_error)?;
    let settings = Settings::from_js(settings).map_err(js_error)?;
    popup::popup_url(&service, &settings).map_err(js_error)
}

#[derive(Serialize)]
struct PopupProps {
    service: ServiceMatch,
    settings: Settings,
}

/// The popup page's side of `popup_url`: `{ service, settings }` from its
/// query string
#[wasm_bindgen]
pub fn parse_popup_query(query: &str) -> Result<JsValue, JsValue> {
    let (service, settings) = popup::parse_popup_query(query).map_err(js_error)?;
    to_js(&PopupProps { service, settings })
}

/// `{ width, height }` of the popup frame
#[wasm_bindgen]
pub fn popup_size(unauthorized: bool) -> Result<JsValue, JsValue> {
    to_js(&PopupSize::for_state(unauthorized))
}

/// Projects from the booking API grouped by customer for the project select
#[wasm_bindgen]
pub fn project_options(projects: JsValue) -> Result<JsValue, JsValue> {
    let projects: Vec<Project> = serde_wasm_bindgen::from_value(projects).map_err(js_error)?;
    to_js(&options::grouped_project_options(&projects))
}

/// The project option with `id` from grouped options, or `null`
#[wasm_bindgen]
pub fn find_project(groups: JsValue, id: &str) -> Result<JsValue, JsValue> {
    let groups: Vec<OptionGroup> = serde_wasm_bindgen::from_value(groups).map_err(js_error)?;
    to_js(&options::find_project(&groups, id))
}

/// The task option with `id` of a project option, or `null`
#[wasm_bindgen]
pub fn find_task(project: JsValue, id: &str) -> Result<JsValue, JsValue> {
    let project: ProjectOption = serde_wasm_bindgen::from_value(project).map_err(js_error)?;
    to_js(&options::find_task(&project, id))
}

// Plain objects rather than JS `Map`s, so the UI can spread them
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(js_error)
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
