/// Supported project-management services
///
/// Each service names its host, the URL patterns of pages that can be booked
/// against (most specific first), and how to read a description and project
/// from such a page. Supporting a new host means adding one entry here.
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::extract::{Document, Probe, first_text, project_identifier_by};
use crate::pattern::Params;

/// Reads one field from a page the service matched
pub type Extractor = fn(&dyn Document, &ServiceDefinition, &Params) -> Option<String>;

#[derive(Debug)]
pub struct ServiceDefinition {
    pub name: &'static str,
    /// May contain an `:org` capture for the customer's subdomain
    pub host: &'static str,
    pub url_patterns: &'static [&'static str],
    pub description: Option<Extractor>,
    pub project_id: Option<Extractor>,
    pub project_label: Option<Extractor>,
    /// Whether a configured host (self-hosted instance or organization) replaces `host`
    pub allow_host_override: bool,
    pub position: Option<Position>,
}

/// CSS placement of the booking bubble, for pages whose own widgets sit
/// where the bubble normally goes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<Cow<'static, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Cow<'static, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<Cow<'static, str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Cow<'static, str>>,
}

pub static SERVICES: &[ServiceDefinition] = &[
    ServiceDefinition {
        name: "gitlab",
        host: "https://gitlab.com",
        url_patterns: &[
            ":host:/:org/:group(/*)/:projectId/-/issues/:id(#note_:noteId)",
            ":host:/:org(/*)/:projectId/-/issues/:id(#note_:noteId)",
            ":host:/:org/:group(/*)/:projectId/-/merge_requests/:id(#note_:noteId)",
            ":host:/:org(/*)/:projectId/-/merge_requests/:id(#note_:noteId)",
        ],
        description: Some(gitlab_description),
        project_id: None,
        project_label: None,
        allow_host_override: true,
        position: None,
    },
    ServiceDefinition {
        name: "monday",
        host: "https://:org.monday.com",
        url_patterns: &[":host:/boards/:board/pulses/:id"],
        description: Some(monday_description),
        project_id: None,
        project_label: None,
        allow_host_override: false,
        position: None,
    },
    ServiceDefinition {
        name: "basecamp3",
        host: "https://3.basecamp.com",
        url_patterns: &[
            ":host:/:instanceId/buckets/:projectId/:bucketType/:id",
            ":host:/:instanceId/buckets/:projectId/:bucketType/cards/:id",
        ],
        description: Some(basecamp_description),
        project_id: Some(basecamp_project_id),
        project_label: None,
        allow_host_override: true,
        position: None,
    },
    ServiceDefinition {
        name: "openproject",
        host: "https://:org.openproject.com",
        url_patterns: &[
            ":host:/projects/:project/work_packages/details/:id(/*)",
            ":host:/projects/:project/work_packages/:id(/*)",
            ":host:/work_packages/details/:id(/*)",
            ":host:/work_packages/:id(/*)",
        ],
        description: Some(openproject_description),
        project_id: Some(openproject_project_id),
        project_label: Some(openproject_project_label),
        allow_host_override: true,
        position: Some(Position {
            top: None,
            right: None,
            bottom: None,
            left: Some(Cow::Borrowed("calc(2rem + 5px)")),
        }),
    },
    ServiceDefinition {
        name: "awork",
        host: "https://:org.awork.io",
        url_patterns: &[
            ":host:/projects/:id/details",
            ":host:/projects/:id/tasks/list",
            ":host:/projects/:id/tasks/board",
            ":host:/projects/:id/tasks/timeline",
            ":host:/projects/:id/times/list",
            ":host:/projects/:projectId/tasks/list/\\(detail\\::id/details\\)",
            ":host:/projects/:projectId/tasks/board/\\(modal\\::id/details\\)",
            ":host:/projects/:projectId/tasks/timeline/\\(detailModal\\::id/details\\)",
            ":host:/tasks/:id/details",
            ":host:/tasks/filters/\\(detail\\::id/details\\)",
        ],
        description: Some(awork_description),
        project_id: None,
        project_label: Some(awork_project_label),
        allow_host_override: true,
        position: Some(Position {
            top: None,
            right: Some(Cow::Borrowed("10px")),
            bottom: Some(Cow::Borrowed("90px")),
            left: None,
        }),
    },
];

pub fn find_service(name: &str) -> Option<&'static ServiceDefinition> {
    SERVICES.iter().find(|service| service.name == name)
}

// GitLab

const GITLAB_TITLE: &[Probe] = &[Probe::text(".detail-page-description .title")];

fn gitlab_description(
    document: &dyn Document,
    _service: &ServiceDefinition,
    params: &Params,
) -> Option<String> {
    let id = params.get("id").unwrap_or_default();
    let title = first_text(document, GITLAB_TITLE).unwrap_or_default();
    Some(format!("#{} {}", id, title).trim().to_string())
}

// Monday

const MONDAY_TITLE: &[Probe] = &[Probe::text(".pulse_title")];

fn monday_description(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    first_text(document, MONDAY_TITLE)
}

// Basecamp 3

const BASECAMP_RECORDING: &[Probe] = &[Probe::attr(
    "head meta[name='current-recording-title']",
    "content",
)];
const BASECAMP_BUCKET: &[Probe] = &[Probe::attr("meta[name=\"current-bucket-name\"]", "content")];

fn basecamp_description(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    first_text(document, BASECAMP_RECORDING)
}

fn basecamp_project_id(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    project_identifier_by(document, BASECAMP_BUCKET)
}

// OpenProject. The `:project` URL segment is either the project's name or an
// internal id, so the project is always read from the page.

const OPENPROJECT_SUBJECT: &[Probe] = &[Probe::text(".work-packages--details--subject")];
const OPENPROJECT_SUBJECT_ID: &[Probe] = &[Probe::first_child_text(".work-packages--info-row")];
const OPENPROJECT_PROJECT: &[Probe] = &[
    Probe::text(".-project-context a"),
    Probe::text("#projects-menu"),
];

fn openproject_description(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    let subject = first_text(document, OPENPROJECT_SUBJECT);
    let subject_id = first_text(document, OPENPROJECT_SUBJECT_ID).map(|id| format!("OP {}", id));

    match (subject_id, subject) {
        (Some(id), Some(subject)) => Some(format!("{} {}", id, subject)),
        (id, subject) => subject.or(id),
    }
}

fn openproject_project_id(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    project_identifier_by(document, OPENPROJECT_PROJECT)
}

fn openproject_project_label(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    first_text(document, OPENPROJECT_PROJECT)
}

// awork renders the same names in a detail view (editable textarea) and in the
// navigation history header, depending on which page is open.

const AWORK_PROJECT: &[Probe] = &[
    Probe::value("aw-project-detail #projectName textarea"),
    Probe::text("aw-header-navigation-history div.main div.entity-details.project"),
];
const AWORK_TASK: &[Probe] = &[
    Probe::value("aw-task-detail h1 textarea"),
    Probe::text("aw-header-navigation-history div.main div.entity-details.task"),
];

fn awork_project_label(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    first_text(document, AWORK_PROJECT)
}

fn awork_description(
    document: &dyn Document,
    _service: &ServiceDefinition,
    _params: &Params,
) -> Option<String> {
    let parts: Vec<String> = [first_text(document, AWORK_PROJECT), first_text(document, AWORK_TASK)]
        .into_iter()
        .flatten()
        .collect();
    Some(parts.join(" - "))
}
