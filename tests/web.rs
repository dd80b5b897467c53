//! Browser tests for the `web_sys` document backend and the exported functions
#![cfg(target_arch = "wasm32")]

use moco_bx::dom::WebDocument;
use moco_bx::extract::{Document, Element, Probe, first_text};
use moco_bx::pattern::Params;
use moco_bx::resolver::{ServiceMatch, ServiceResolver};
use moco_bx::services::SERVICES;
use moco_bx::settings::Settings;
use moco_bx::{
    find_project, find_task, has_invalid_configuration, match_current_page, match_url,
    parse_popup_query, popup_size, popup_url, project_options,
};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlTextAreaElement;

wasm_bindgen_test_configure!(run_in_browser);

fn fixture(html: &str) -> WebDocument {
    let document = web_sys::window().unwrap().document().unwrap();
    document.body().unwrap().set_inner_html(html);
    WebDocument::new(document)
}

#[wasm_bindgen_test]
fn reads_text_and_attributes() {
    let doc = fixture(r#"<h2 class="title"> Broken login </h2><a id="p" data-id="7">[WEB] Website</a>"#);

    assert_eq!(Probe::text(".title").read(&doc), Some("Broken login".to_string()));
    assert_eq!(Probe::attr("#p", "data-id").read(&doc), Some("7".to_string()));
    assert!(doc.query(".missing").is_none());
}

#[wasm_bindgen_test]
fn reads_live_textarea_value() {
    let doc = fixture(r#"<aw-task-detail><h1><textarea>Old name</textarea></h1></aw-task-detail>"#);
    let textarea = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .query_selector("textarea")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlTextAreaElement>()
        .unwrap();
    textarea.set_value("Edited name");

    assert_eq!(
        first_text(&doc, &[Probe::value("aw-task-detail h1 textarea")]),
        Some("Edited name".to_string())
    );
}

#[wasm_bindgen_test]
fn invalid_selector_is_no_match() {
    let doc = fixture("<p>text</p>");
    assert!(doc.query("p[").is_none());
}

#[wasm_bindgen_test]
fn matches_page_against_live_document() {
    let doc = fixture(r#"<div class="pulse_title">Plan launch</div>"#);
    let resolver = ServiceResolver::new(SERVICES, None);

    let service_match = resolver
        .match_page("https://acme.monday.com/boards/1/pulses/2", &doc)
        .unwrap();

    assert_eq!(service_match.name, "monday");
    assert_eq!(service_match.description, "Plan launch");
}

#[wasm_bindgen_test]
fn first_child_comment_reads_its_text() {
    let doc = fixture(r#"<div id="row"><!-- 42 -->#42</div>"#);

    assert_eq!(doc.query("#row").unwrap().first_child_text(), Some(" 42 ".to_string()));
}

fn get(value: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
}

fn settings(host_override: Option<&str>) -> JsValue {
    serde_wasm_bindgen::to_value(&Settings {
        subdomain: Some("acme".to_string()),
        api_key: Some("secret".to_string()),
        version: None,
        host_override: host_override.map(str::to_string),
    })
    .unwrap()
}

#[wasm_bindgen_test]
fn match_url_returns_plain_objects() {
    let found = match_url(
        "https://git.acme.dev/acme/app/-/issues/42#note_7",
        Some("https://git.acme.dev".to_string()),
    )
    .unwrap();

    assert_eq!(get(&found, "name").as_string().as_deref(), Some("gitlab"));
    assert_eq!(get(&found, "host").as_string().as_deref(), Some("https://git.acme.dev"));

    let params = get(&found, "params");
    assert!(params.is_object());
    assert!(!params.is_instance_of::<js_sys::Map>());
    assert_eq!(get(&params, "id").as_string().as_deref(), Some("42"));
    assert_eq!(get(&params, "noteId").as_string().as_deref(), Some("7"));
}

#[wasm_bindgen_test]
fn match_url_without_override() {
    assert!(match_url("https://git.acme.dev/acme/app/-/issues/42", None).unwrap().is_null());
    assert!(match_url("https://git.acme.dev/acme/app/-/issues/42", Some(" ".to_string()))
        .unwrap()
        .is_null());
}

#[wasm_bindgen_test]
fn missing_settings_are_invalid() {
    assert!(has_invalid_configuration(JsValue::UNDEFINED).unwrap());
    assert!(has_invalid_configuration(JsValue::NULL).unwrap());
    assert!(!has_invalid_configuration(settings(None)).unwrap());
}

#[wasm_bindgen_test]
fn matches_current_page_with_configured_host() {
    let window = web_sys::window().unwrap();
    let history = window.history().unwrap();
    let location = window.location();
    let original = location.href().unwrap();
    let origin = location.origin().unwrap();

    fixture(r#"<div class="detail-page-description"><h2 class="title">Broken login</h2></div>"#);
    history
        .replace_state_with_url(&JsValue::NULL, "", Some("/acme/app/-/issues/42"))
        .unwrap();

    let without_override = match_current_page(settings(None)).unwrap();
    let found = match_current_page(settings(Some(&origin))).unwrap();

    history
        .replace_state_with_url(&JsValue::NULL, "", Some(&original))
        .unwrap();

    assert!(without_override.is_null());
    assert_eq!(get(&found, "name").as_string().as_deref(), Some("gitlab"));
    assert_eq!(get(&found, "host").as_string(), Some(origin));
    assert_eq!(get(&found, "id").as_string().as_deref(), Some("42"));
    assert_eq!(
        get(&found, "description").as_string().as_deref(),
        Some("#42 Broken login")
    );
    assert!(!get(&found, "params").is_instance_of::<js_sys::Map>());
}

#[wasm_bindgen_test]
fn project_options_and_lookups() {
    let projects = js_sys::JSON::parse(
        r#"[{"id": 1, "name": "Website", "customer_name": "Acme",
             "tasks": [{"id": 10, "name": "Meetings", "billable": false}]}]"#,
    )
    .unwrap();

    let groups = project_options(projects).unwrap();
    let project = find_project(groups.clone(), "1").unwrap();

    assert_eq!(get(&project, "customerName").as_string().as_deref(), Some("Acme"));
    assert!(find_project(groups, "website").unwrap().is_null());

    let task = find_task(project.clone(), "10").unwrap();
    assert_eq!(get(&task, "label").as_string().as_deref(), Some("(Meetings)"));
    assert!(find_task(project, "11").unwrap().is_null());
}

#[wasm_bindgen_test]
fn popup_props_round_trip() {
    let service = ServiceMatch {
        name: "gitlab".to_string(),
        url: "https://gitlab.com/acme/app/-/issues/42".to_string(),
        host: "https://gitlab.com".to_string(),
        id: Some("42".to_string()),
        description: "#42 Broken login".to_string(),
        project_id: None,
        project_label: None,
        position: None,
        params: [("org", "acme"), ("projectId", "app"), ("id", "42")]
            .into_iter()
            .collect::<Params>(),
    }
    .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
    .unwrap();

    let url = popup_url(service, settings(None)).unwrap();
    let props = parse_popup_query(url.strip_prefix("popup.html").unwrap()).unwrap();

    let service = get(&props, "service");
    assert_eq!(get(&service, "description").as_string().as_deref(), Some("#42 Broken login"));
    assert_eq!(
        get(&get(&service, "params"), "projectId").as_string().as_deref(),
        Some("app")
    );
    assert_eq!(
        get(&get(&props, "settings"), "subdomain").as_string().as_deref(),
        Some("acme")
    );
}

#[wasm_bindgen_test]
fn popup_size_by_state() {
    assert_eq!(get(&popup_size(false).unwrap(), "height").as_f64(), Some(400.0));
    assert_eq!(get(&popup_size(true).unwrap(), "height").as_f64(), Some(890.0));
    assert_eq!(get(&popup_size(true).unwrap(), "width").as_f64(), Some(536.0));
}
