//! Compiled path patterns.
//!
//! A [`RoutePattern`] is an ordered list of tagged [`Segment`]s compiled once from a
//! template and shared read-only between requests. Matching walks the request path
//! left to right:
//!
//! - [`Segment::Literal`] needs one or more `/` followed by the literal text, ending on a
//!   segment boundary (`/users/edit` does not match `/users/editor`)
//! - [`Segment::Parameter`] captures one segment ([`ParamKind::Single`]) or everything
//!   left ([`ParamKind::Rest`])
//! - [`Segment::FormatSplit`] optionally consumes a format suffix such as `.json`
//!
//! Hand-written templates use `:name` for a single segment and `*name` for the rest.

use crate::error::PatternError;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Parameter(Param),
    FormatSplit(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Single,
    Rest,
}

/// Name of the rest parameter every action pattern ends with.
pub const PATH_PARAM: &str = "path";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Parses a hand-written template such as `/articles/:id/*rest`.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let parts = template.split('/').filter(|part| !part.is_empty()).collect::<Vec<_>>();
        let mut segments = Vec::with_capacity(parts.len());

        for (index, part) in parts.iter().enumerate() {
            let segment = if let Some(name) = part.strip_prefix(':') {
                Segment::Parameter(Param { name: param_name(name, template)?, kind: ParamKind::Single })
            } else if let Some(name) = part.strip_prefix('*') {
                if index + 1 != parts.len() {
                    return Err(PatternError::RestNotLast { template: template.to_owned() });
                }
                Segment::Parameter(Param { name: param_name(name, template)?, kind: ParamKind::Rest })
            } else {
                Segment::Literal((*part).to_owned())
            };
            segments.push(segment);
        }

        Ok(Self { source: template.to_owned(), segments })
    }

    /// Builds the pattern of an action: the literal template, an optional format
    /// boundary, and a trailing rest capture carrying the action's path info.
    pub fn action(template: &str, formats: &[String]) -> Self {
        let source = normalize_path(template);
        let mut segments = source
            .split('/')
            .filter(|part| !part.is_empty())
            .map(|part| Segment::Literal(part.to_owned()))
            .collect::<Vec<_>>();

        if !formats.is_empty() {
            segments.push(Segment::FormatSplit(formats.to_vec()));
        }
        segments.push(Segment::Parameter(Param { name: PATH_PARAM.to_owned(), kind: ParamKind::Rest }));

        Self { source, segments }
    }

    /// The template this pattern was compiled from; its length orders resolution.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Formats accepted by the format boundary; empty when there is none.
    pub fn formats(&self) -> &[String] {
        self.segments
            .iter()
            .find_map(|segment| match segment {
                Segment::FormatSplit(formats) => Some(formats.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// The same pattern with `extra` added to its format boundary, or `None` when
    /// every format in `extra` is already accepted.
    ///
    /// Actions sharing a template share one pattern, so the boundary has to accept
    /// the formats of all of them. Which action may take a given format is decided
    /// at resolution time.
    pub fn with_formats(&self, extra: &[String]) -> Option<Self> {
        let mut union = self.formats().to_vec();
        for fmt in extra {
            if !union.contains(fmt) {
                union.push(fmt.clone());
            }
        }
        if union.len() == self.formats().len() {
            return None;
        }

        let mut segments = self.segments.clone();
        if let Some(Segment::FormatSplit(formats)) =
            segments.iter_mut().find(|segment| matches!(segment, Segment::FormatSplit(_)))
        {
            *formats = union;
        } else {
            let at = match segments.last() {
                Some(Segment::Parameter(Param { kind: ParamKind::Rest, .. })) => segments.len() - 1,
                _ => segments.len(),
            };
            segments.insert(at, Segment::FormatSplit(union));
        }

        Some(Self { source: self.source.clone(), segments })
    }

    pub fn matches<'a>(&self, path: &'a str) -> Option<RouteMatch<'a>> {
        let mut pos = 0;
        let mut captures = Vec::new();
        let mut format = None;

        for (index, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(text) => {
                    pos = skip_separators(path, pos)?;
                    if !path[pos..].starts_with(text.as_str()) {
                        return None;
                    }
                    pos += text.len();

                    let next_is_format = matches!(self.segments.get(index + 1), Some(Segment::FormatSplit(_)));
                    if !next_is_format && !is_boundary(&path[pos..]) {
                        return None;
                    }
                }
                Segment::FormatSplit(formats) => {
                    let rest = &path[pos..];
                    if let Some(found) = formats
                        .iter()
                        .find(|fmt| rest.strip_prefix(fmt.as_str()).is_some_and(is_boundary))
                    {
                        format = Some(&path[pos..pos + found.len()]);
                        pos += found.len();
                    } else if !is_boundary(rest) {
                        return None;
                    }
                }
                Segment::Parameter(Param { kind: ParamKind::Single, .. }) => {
                    pos = skip_separators(path, pos)?;
                    let len = path[pos..].find('/').unwrap_or(path.len() - pos);
                    if len == 0 {
                        return None;
                    }
                    captures.push((pos, pos + len));
                    pos += len;
                }
                Segment::Parameter(Param { kind: ParamKind::Rest, .. }) => {
                    if !is_boundary(&path[pos..]) {
                        return None;
                    }
                    captures.push((pos, path.len()));
                    pos = path.len();
                }
            }
        }

        if path[pos..].bytes().all(|b| b == b'/') {
            Some(RouteMatch { path, end: pos, captures, format })
        } else {
            None
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// The outcome of matching a path against a [`RoutePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    path: &'a str,
    end: usize,
    captures: Vec<(usize, usize)>,
    format: Option<&'a str>,
}

impl<'a> RouteMatch<'a> {
    pub fn captures(&self) -> Vec<&'a str> {
        self.captures.iter().map(|&(start, end)| &self.path[start..end]).collect()
    }

    pub fn first_capture(&self) -> Option<&'a str> {
        self.captures.first().map(|&(start, end)| &self.path[start..end])
    }

    /// The part of the path in front of the first capture, or the whole match
    /// when nothing was captured.
    pub fn consumed(&self) -> &'a str {
        let end = self.captures.first().map_or(self.end, |&(start, _)| start);
        &self.path[..end]
    }

    /// A format suffix consumed by a [`Segment::FormatSplit`].
    pub fn format(&self) -> Option<&'a str> {
        self.format
    }
}

/// Splits a declared format suffix off a path: `/5.json` becomes `/5` and `.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSplitter {
    formats: Vec<String>,
}

impl FormatSplitter {
    pub fn new(formats: Vec<String>) -> Self {
        Self { formats }
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn accepts(&self, format: &str) -> bool {
        self.formats.iter().any(|fmt| fmt == format)
    }

    pub fn split<'a>(&self, path: &'a str) -> (&'a str, Option<&'a str>) {
        self.formats
            .iter()
            .find_map(|fmt| {
                path.strip_suffix(fmt.as_str()).map(|clean| (clean, Some(&path[clean.len()..])))
            })
            .unwrap_or((path, None))
    }
}

/// Joins and normalizes path pieces: one leading `/`, no empty segments, no trailing `/`.
pub fn join_paths<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for part in pieces.into_iter().flat_map(|piece| piece.split('/')).filter(|part| !part.is_empty()) {
        joined.push('/');
        joined.push_str(part);
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}

pub fn normalize_path(path: &str) -> String {
    join_paths([path])
}

fn param_name(name: &str, template: &str) -> Result<String, PatternError> {
    if name.is_empty() {
        Err(PatternError::EmptyParameterName { template: template.to_owned() })
    } else {
        Ok(name.to_owned())
    }
}

/// Advances over one or more `/`, failing when there is none.
fn skip_separators(path: &str, pos: usize) -> Option<usize> {
    let count = path[pos..].bytes().take_while(|&b| b == b'/').count();
    if count == 0 { None } else { Some(pos + count) }
}

fn is_boundary(rest: &str) -> bool {
    rest.is_empty() || rest.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::{FormatSplitter, ParamKind, RoutePattern, Segment, join_paths};
    use crate::error::PatternError;

    fn formats(list: &[&str]) -> Vec<String> {
        list.iter().map(|fmt| (*fmt).to_owned()).collect()
    }

    #[test]
    fn action_pattern_captures_rest() {
        let pattern = RoutePattern::action("/users/edit", &[]);

        let matched = pattern.matches("/users/edit/5/6").unwrap();
        assert_eq!(matched.first_capture(), Some("/5/6"));
        assert_eq!(matched.consumed(), "/users/edit");

        let matched = pattern.matches("/users/edit").unwrap();
        assert_eq!(matched.first_capture(), Some(""));
    }

    #[test]
    fn literal_ends_on_segment_boundary() {
        let pattern = RoutePattern::action("/users/edit", &[]);
        assert!(pattern.matches("/users/editor").is_none());
        assert!(pattern.matches("/users").is_none());
        assert!(pattern.matches("/people/edit").is_none());
    }

    #[test]
    fn repeated_separators_are_collapsed() {
        let pattern = RoutePattern::action("/users/edit", &[]);
        let matched = pattern.matches("//users///edit/1").unwrap();
        assert_eq!(matched.first_capture(), Some("/1"));
        assert_eq!(matched.consumed(), "//users///edit");
    }

    #[test]
    fn root_pattern_matches_everything() {
        let pattern = RoutePattern::action("/", &[]);
        assert_eq!(pattern.source(), "/");
        assert_eq!(pattern.matches("/").unwrap().first_capture(), Some("/"));
        assert_eq!(pattern.matches("/a/b").unwrap().first_capture(), Some("/a/b"));
        assert_eq!(pattern.matches("").unwrap().first_capture(), Some(""));
    }

    #[test]
    fn format_directly_after_literal() {
        let pattern = RoutePattern::action("/users/edit", &formats(&[".json", ".xml"]));

        let matched = pattern.matches("/users/edit.json").unwrap();
        assert_eq!(matched.format(), Some(".json"));
        assert_eq!(matched.consumed(), "/users/edit.json");
        assert_eq!(matched.first_capture(), Some(""));

        let matched = pattern.matches("/users/edit.xml/7").unwrap();
        assert_eq!(matched.format(), Some(".xml"));
        assert_eq!(matched.first_capture(), Some("/7"));

        let matched = pattern.matches("/users/edit/7").unwrap();
        assert_eq!(matched.format(), None);

        assert!(pattern.matches("/users/edit.html").is_none());
        assert!(pattern.matches("/users/editor").is_none());
    }

    #[test]
    fn shared_template_accepts_every_declared_format() {
        let plain = RoutePattern::action("/users/edit", &[]);
        assert!(plain.formats().is_empty());
        assert!(plain.matches("/users/edit.json").is_none());

        let widened = plain.with_formats(&formats(&[".json"])).unwrap();
        assert_eq!(widened.source(), "/users/edit");
        assert_eq!(widened.formats(), [".json"]);
        assert_eq!(widened.matches("/users/edit.json").unwrap().format(), Some(".json"));
        assert_eq!(widened.matches("/users/edit/5").unwrap().first_capture(), Some("/5"));

        let widened = widened.with_formats(&formats(&[".xml", ".json"])).unwrap();
        assert_eq!(widened.formats(), [".json", ".xml"]);
        assert!(widened.with_formats(&formats(&[".xml"])).is_none());
        assert!(widened.with_formats(&[]).is_none());
    }

    #[test]
    fn parse_template_with_parameters() {
        let pattern = RoutePattern::parse("/articles/:id/*rest").unwrap();
        assert_eq!(pattern.segments().len(), 3);
        assert!(matches!(&pattern.segments()[2], Segment::Parameter(param) if param.kind == ParamKind::Rest));

        let matched = pattern.matches("/articles/42/comments/1").unwrap();
        assert_eq!(matched.captures(), vec!["42", "/comments/1"]);
        assert_eq!(matched.first_capture(), Some("42"));

        assert!(pattern.matches("/articles").is_none());
        assert!(pattern.matches("/articles/").is_none());
    }

    #[test]
    fn literal_only_template_has_no_capture() {
        let pattern = RoutePattern::parse("/legacy/home").unwrap();

        let matched = pattern.matches("/legacy/home/").unwrap();
        assert_eq!(matched.first_capture(), None);
        assert_eq!(matched.consumed(), "/legacy/home");
        assert!(pattern.matches("/legacy/home/more").is_none());
    }

    #[test]
    fn parse_rejects_bad_templates() {
        assert_eq!(
            RoutePattern::parse("/a/:/b"),
            Err(PatternError::EmptyParameterName { template: "/a/:/b".into() })
        );
        assert_eq!(RoutePattern::parse("/a/*rest/b"), Err(PatternError::RestNotLast { template: "/a/*rest/b".into() }));
    }

    #[test]
    fn format_splitter() {
        let splitter = FormatSplitter::new(formats(&[".json"]));
        assert_eq!(splitter.split("/5.json"), ("/5", Some(".json")));
        assert_eq!(splitter.split("/5"), ("/5", None));
        assert_eq!(splitter.split(""), ("", None));
    }

    #[test]
    fn join_and_normalize() {
        assert_eq!(join_paths(["", "/"]), "/");
        assert_eq!(join_paths(["/api/", "v1", "/users/"]), "/api/v1/users");
        assert_eq!(join_paths(["api//x"]), "/api/x");
    }
}
