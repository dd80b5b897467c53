/// URL pattern parsing and compilation
use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PatternError;

/// Placeholder replaced by the service's host template
pub const HOST_PLACEHOLDER: &str = ":host:";

/// Capture name that a configured organization pins inside host templates
pub const ORG_CAPTURE: &str = "org";

// A path capture stops at the next path, fragment or query delimiter.
const PATH_VALUE: &str = "[^/#?]+";
const HOST_LABEL: &str = "[A-Za-z0-9-]+";

/// One node of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Capture(String),
    Wildcard,
    Optional(Vec<Segment>),
    Host,
}

/// A parsed URL pattern such as `:host:/projects/:id(/*)`.
///
/// Syntax:
/// - `:name` captures one or more characters up to the next `/`, `#` or `?`
/// - `*` matches anything (lazily) and is not captured
/// - `( ... )` marks an optional group, groups may nest
/// - `\x` turns any character into a literal, e.g. `\(` or `\:`
/// - `:host:` is replaced by the service's host template at compile time
///
/// A `:` that is not followed by a name character is a plain literal, so
/// `https://` needs no escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Pattern, PatternError> {
        let segments = parse_segments(source)?;

        let mut names = Vec::new();
        collect_captures(&segments, &mut names);
        ensure_unique(source, &names)?;

        Ok(Pattern {
            source: source.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Names of all captures, in order of appearance
    pub fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_captures(&self.segments, &mut names);
        names
    }

    /// Compile into an anchored matcher, splicing in `host` for `:host:`.
    pub fn compile(&self, host: &HostTemplate) -> Result<Matcher, PatternError> {
        let mut names = self.capture_names();
        if contains_host(&self.segments) {
            names.extend(host.capture_names());
        }
        ensure_unique(&self.source, &names)?;

        let mut expr = String::from("^");
        write_segments(&self.segments, host, &mut expr);
        expr.push('$');

        let regex = Regex::new(&expr).map_err(|source| PatternError::Regex {
            pattern: self.source.clone(),
            source,
        })?;

        Ok(Matcher { regex })
    }
}

/// The host part a pattern's `:host:` expands to, e.g. `https://:org.monday.com`.
///
/// Host templates only hold literals and captures. Captures match a single DNS
/// label and the whole host compares case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTemplate {
    segments: Vec<Segment>,
    org: Option<String>,
}

impl HostTemplate {
    pub fn parse(template: &str) -> Result<HostTemplate, PatternError> {
        let segments = parse_segments(template)?;
        let plain = segments
            .iter()
            .all(|s| matches!(s, Segment::Literal(_) | Segment::Capture(_)));
        if !plain {
            return Err(PatternError::InvalidHost {
                template: template.to_string(),
            });
        }

        let mut names = Vec::new();
        collect_captures(&segments, &mut names);
        ensure_unique(template, &names)?;

        Ok(HostTemplate {
            segments,
            org: None,
        })
    }

    /// A host taken verbatim, without any captures
    pub fn literal(host: &str) -> HostTemplate {
        HostTemplate {
            segments: vec![Segment::Literal(host.to_string())],
            org: None,
        }
    }

    /// Pin the `:org` capture to a configured organization.
    pub fn with_org(mut self, org: &str) -> HostTemplate {
        self.org = Some(org.to_string());
        self
    }

    pub fn has_org(&self) -> bool {
        self.capture_names().contains(&ORG_CAPTURE)
    }

    fn capture_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_captures(&self.segments, &mut names);
        names
    }

    fn write_regex(&self, out: &mut String) {
        out.push_str("(?i:");
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&regex::escape(text)),
                Segment::Capture(name) => match &self.org {
                    Some(org) if name == ORG_CAPTURE => {
                        out.push_str(&format!("(?P<{}>{})", name, regex::escape(org)));
                    }
                    _ => out.push_str(&format!("(?P<{}>{})", name, HOST_LABEL)),
                },
                _ => {}
            }
        }
        out.push(')');
    }
}

/// Named parameters captured by a successful match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Match the whole of `input`. Captures inside absent optional groups are
    /// left out of the result.
    pub fn matches(&self, input: &str) -> Option<Params> {
        let caps = self.regex.captures(input)?;
        let params = self
            .regex
            .capture_names()
            .flatten()
            .filter_map(|name| caps.name(name).map(|m| (name, m.as_str())))
            .collect();
        Some(params)
    }
}

fn parse_segments(source: &str) -> Result<Vec<Segment>, PatternError> {
    // Enclosing segment lists with the offset of the '(' that opened each group
    let mut stack: Vec<(usize, Vec<Segment>)> = Vec::new();
    let mut current = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => literal.push(escaped),
                None => {
                    return Err(PatternError::DanglingEscape {
                        pattern: source.to_string(),
                    });
                }
            },
            '(' => {
                flush_literal(&mut literal, &mut current);
                stack.push((offset, std::mem::take(&mut current)));
            }
            ')' => {
                flush_literal(&mut literal, &mut current);
                let Some((_, outer)) = stack.pop() else {
                    return Err(PatternError::UnexpectedGroupEnd {
                        pattern: source.to_string(),
                        offset,
                    });
                };
                let group = std::mem::replace(&mut current, outer);
                current.push(Segment::Optional(group));
            }
            '*' => {
                flush_literal(&mut literal, &mut current);
                current.push(Segment::Wildcard);
            }
            ':' if source[offset..].starts_with(HOST_PLACEHOLDER) => {
                flush_literal(&mut literal, &mut current);
                current.push(Segment::Host);
                for _ in 1..HOST_PLACEHOLDER.len() {
                    chars.next();
                }
            }
            ':' if chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_') =>
            {
                flush_literal(&mut literal, &mut current);
                let mut name = String::new();
                while let Some(&(_, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    name.push(next);
                    chars.next();
                }
                current.push(Segment::Capture(name));
            }
            _ => literal.push(c),
        }
    }

    if let Some((offset, _)) = stack.pop() {
        return Err(PatternError::UnclosedGroup {
            pattern: source.to_string(),
            offset,
        });
    }

    flush_literal(&mut literal, &mut current);
    Ok(current)
}

fn flush_literal(literal: &mut String, segments: &mut Vec<Segment>) {
    if !literal.is_empty() {
        segments.push(Segment::Literal(std::mem::take(literal)));
    }
}

fn collect_captures<'a>(segments: &'a [Segment], names: &mut Vec<&'a str>) {
    for segment in segments {
        match segment {
            Segment::Capture(name) => names.push(name),
            Segment::Optional(inner) => collect_captures(inner, names),
            _ => {}
        }
    }
}

fn contains_host(segments: &[Segment]) -> bool {
    segments.iter().any(|segment| match segment {
        Segment::Host => true,
        Segment::Optional(inner) => contains_host(inner),
        _ => false,
    })
}

fn ensure_unique(source: &str, names: &[&str]) -> Result<(), PatternError> {
    for (i, name) in names.iter().enumerate() {
        if names[..i].contains(name) {
            return Err(PatternError::DuplicateCapture {
                pattern: source.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn write_segments(segments: &[Segment], host: &HostTemplate, out: &mut String) {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(&regex::escape(text)),
            Segment::Capture(name) => out.push_str(&format!("(?P<{}>{})", name, PATH_VALUE)),
            Segment::Wildcard => out.push_str(".*?"),
            Segment::Optional(inner) => {
                out.push_str("(?:");
                write_segments(inner, host, out);
                out.push_str(")?");
            }
            Segment::Host => host.write_regex(out),
        }
    }
}
