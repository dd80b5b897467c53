/// Resolution of page URLs to services
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PatternError;
use crate::extract::{Document, extract};
use crate::pattern::{HOST_PLACEHOLDER, HostTemplate, Matcher, Params, Pattern};
use crate::services::{Position, SERVICES, ServiceDefinition};

/// The service a URL belongs to and the parameters its pattern captured
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub service: &'a ServiceDefinition,
    pub params: Params,
    /// Origin of the matched URL, e.g. `https://acme.monday.com`
    pub host: String,
}

/// Everything the booking bubble needs to know about the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMatch {
    pub name: String,
    pub url: String,
    pub host: String,
    pub id: Option<String>,
    pub description: String,
    pub project_id: Option<String>,
    pub project_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub params: Params,
}

impl Resolution<'_> {
    /// Extract the page fields and combine them with the match.
    pub fn to_service_match(&self, url: &str, document: &dyn Document) -> ServiceMatch {
        let fields = extract(document, self.service, &self.params);
        ServiceMatch {
            name: self.service.name.to_string(),
            url: url.to_string(),
            host: self.host.clone(),
            id: self.params.get("id").map(str::to_string),
            description: fields.description,
            project_id: fields.project_id,
            project_label: fields.project_label,
            position: self.service.position.clone(),
            params: self.params.clone(),
        }
    }
}

struct CompiledService<'a> {
    service: &'a ServiceDefinition,
    origin: Matcher,
    patterns: Vec<Matcher>,
}

impl CompiledService<'_> {
    fn match_path(&self, target: &str) -> Option<Params> {
        self.patterns.iter().find_map(|matcher| matcher.matches(target))
    }
}

/// Services compiled for one host-override setting.
///
/// Services are tried in order. The first whose host matches the URL decides
/// the outcome: if none of its patterns match, the page is inactive even if a
/// later service would also accept the host.
pub struct ServiceResolver<'a> {
    entries: Vec<CompiledService<'a>>,
}

impl<'a> ServiceResolver<'a> {
    /// Compile every service. A service with a malformed host or pattern is
    /// logged and left out; the others stay usable.
    pub fn new(services: &'a [ServiceDefinition], host_override: Option<&str>) -> Self {
        let host_override = host_override.map(str::trim).filter(|value| !value.is_empty());

        let entries = services
            .iter()
            .filter_map(|service| match compile_service(service, host_override) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::error!("skipping service {}: {}", service.name, err);
                    None
                }
            })
            .collect();

        ServiceResolver { entries }
    }

    /// Names of the services that compiled, in resolution order
    pub fn service_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|entry| entry.service.name)
    }

    pub fn resolve(&self, url: &str) -> Option<Resolution<'a>> {
        let Some(target) = MatchTarget::parse(url) else {
            log::debug!("not a matchable url: {}", url);
            return None;
        };

        let entry = self
            .entries
            .iter()
            .find(|entry| entry.origin.matches(&target.origin).is_some());
        let Some(entry) = entry else {
            log::debug!("no service for {}", target.origin);
            return None;
        };

        // A fragment the patterns do not expect must not hide the page itself
        let params = entry.match_path(&target.with_fragment()).or_else(|| {
            target
                .fragment
                .as_ref()
                .and_then(|_| entry.match_path(&target.without_fragment()))
        });

        match params {
            Some(params) => {
                log::debug!("{} matched {}: {:?}", url, entry.service.name, params);
                Some(Resolution {
                    service: entry.service,
                    params,
                    host: target.origin,
                })
            }
            None => {
                log::debug!("{} is on {} but no pattern matched", url, entry.service.name);
                None
            }
        }
    }

    /// Resolve and extract in one step
    pub fn match_page(&self, url: &str, document: &dyn Document) -> Option<ServiceMatch> {
        self.resolve(url)
            .map(|resolution| resolution.to_service_match(url, document))
    }
}

static DEFAULT_RESOLVER: LazyLock<Arc<ServiceResolver<'static>>> =
    LazyLock::new(|| Arc::new(ServiceResolver::new(SERVICES, None)));

// Compiled resolvers by trimmed override value
static OVERRIDE_RESOLVERS: LazyLock<Mutex<HashMap<String, Arc<ServiceResolver<'static>>>>> =
    LazyLock::new(Default::default);

/// The built-in services compiled for `host_override`. Repeated calls with
/// the same value share one compiled resolver.
pub fn resolver_for(host_override: Option<&str>) -> Arc<ServiceResolver<'static>> {
    let Some(value) = host_override.map(str::trim).filter(|value| !value.is_empty()) else {
        return Arc::clone(&DEFAULT_RESOLVER);
    };

    let mut cache = OVERRIDE_RESOLVERS
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let resolver = cache.entry(value.to_string()).or_insert_with(|| {
        log::debug!("compiling services for host override {}", value);
        Arc::new(ServiceResolver::new(SERVICES, Some(value)))
    });
    Arc::clone(resolver)
}

/// Resolve `url` against the built-in services.
pub fn resolve(url: &str, host_override: Option<&str>) -> Option<Resolution<'static>> {
    resolver_for(host_override).resolve(url)
}

fn compile_service<'a>(
    service: &'a ServiceDefinition,
    host_override: Option<&str>,
) -> Result<CompiledService<'a>, PatternError> {
    let host = host_template(service, host_override)?;
    let origin = Pattern::parse(HOST_PLACEHOLDER)?.compile(&host)?;
    let patterns = service
        .url_patterns
        .iter()
        .map(|source| Pattern::parse(source)?.compile(&host))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledService {
        service,
        origin,
        patterns,
    })
}

/// The host a service is matched against.
///
/// An override only applies to services that allow one. A value with a
/// scheme (`https://git.example.com`) replaces the host outright; a bare
/// name pins the template's `:org`.
fn host_template(
    service: &ServiceDefinition,
    host_override: Option<&str>,
) -> Result<HostTemplate, PatternError> {
    let template = HostTemplate::parse(service.host)?;
    match host_override {
        Some(value) if service.allow_host_override && value.contains("://") => {
            Ok(HostTemplate::literal(value.trim_end_matches('/')))
        }
        Some(org) if service.allow_host_override && template.has_org() => Ok(template.with_org(org)),
        _ => Ok(template),
    }
}

/// The parts of a URL patterns are matched against. The query string never
/// takes part in matching.
struct MatchTarget {
    origin: String,
    path: String,
    fragment: Option<String>,
}

impl MatchTarget {
    fn parse(url: &str) -> Option<MatchTarget> {
        let parsed = Url::parse(url.trim()).ok()?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return None;
        }

        Some(MatchTarget {
            origin: parsed.origin().ascii_serialization(),
            path: parsed.path().to_string(),
            fragment: parsed.fragment().map(str::to_string),
        })
    }

    fn with_fragment(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}{}#{}", self.origin, self.path, fragment),
            None => self.without_fragment(),
        }
    }

    fn without_fragment(&self) -> String {
        format!("{}{}", self.origin, self.path)
    }
}
