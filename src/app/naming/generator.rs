//! Template rendering and filename sanitation
//!
//! Rendering is a pure function of the template and the supplied fields: one
//! pass of `{token}` substitution against a closed placeholder set, followed
//! by sanitation. Unrecognized tokens are left as literal text rather than
//! rejected, so an imported template from another tool degrades gracefully.

use chrono::{NaiveDate, Utc};

use crate::app::models::QueueItem;
use crate::constants::naming::{ILLEGAL_FILENAME_CHARS, MAX_FILENAME_LEN};

/// The closed set of tokens a template may reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{title}` - display title
    Title,
    /// `{channel}` - source channel or uploader name
    Channel,
    /// `{quality}` - quality label
    Quality,
    /// `{format}` - container format
    Format,
    /// `{date}` - ISO date, defaults to today
    Date,
    /// `{duration}` - run time, e.g. `12m03s`
    Duration,
    /// `{source_id}` - external source identifier
    SourceId,
}

impl Placeholder {
    /// Parse the text between braces; `None` keeps the token literal
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "title" => Some(Self::Title),
            "channel" => Some(Self::Channel),
            "quality" => Some(Self::Quality),
            "format" => Some(Self::Format),
            "date" => Some(Self::Date),
            "duration" => Some(Self::Duration),
            "source_id" => Some(Self::SourceId),
            _ => None,
        }
    }

    fn resolve(&self, fields: &NameFields) -> String {
        match self {
            Self::Title => fields.title.clone().unwrap_or_default(),
            Self::Channel => fields.channel.clone().unwrap_or_default(),
            Self::Quality => fields.quality.clone().unwrap_or_default(),
            Self::Format => fields.format.clone().unwrap_or_default(),
            Self::Date => fields
                .date
                .unwrap_or_else(|| Utc::now().date_naive())
                .format("%Y-%m-%d")
                .to_string(),
            Self::Duration => fields
                .duration_secs
                .map(format_duration)
                .unwrap_or_default(),
            Self::SourceId => fields.source_id.clone().unwrap_or_default(),
        }
    }
}

/// Field values available to a template
#[derive(Debug, Clone, Default)]
pub struct NameFields {
    /// Display title
    pub title: Option<String>,
    /// Source channel or uploader name
    pub channel: Option<String>,
    /// Quality label
    pub quality: Option<String>,
    /// Container format
    pub format: Option<String>,
    /// Acquisition date; today when not supplied
    pub date: Option<NaiveDate>,
    /// Run time in seconds
    pub duration_secs: Option<u64>,
    /// External source identifier
    pub source_id: Option<String>,
}

impl NameFields {
    /// Populate fields from a queued job's metadata
    pub fn from_item(item: &QueueItem) -> Self {
        Self {
            title: Some(item.title.clone()),
            channel: None,
            quality: Some(item.quality.clone()),
            format: Some(item.format.clone()),
            date: None,
            duration_secs: None,
            source_id: Some(item.source_id.clone()),
        }
    }
}

/// Render a template against the supplied fields
///
/// Deterministic for a fixed field set (the `{date}` default is the only
/// environmental input, and only when no date is supplied). The result is
/// sanitized and safe as a filename on common filesystems, but not globally
/// unique; callers needing uniqueness append a disambiguator such as the
/// job id.
pub fn render(template: &str, fields: &NameFields) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        match rest[open..].find('}') {
            Some(close_rel) => {
                let close = open + close_rel;
                let token = &rest[open + 1..close];
                match Placeholder::from_token(token) {
                    Some(placeholder) => out.push_str(&placeholder.resolve(fields)),
                    None => out.push_str(&rest[open..=close]),
                }
                rest = &rest[close + 1..];
            }
            None => {
                // Unclosed brace: nothing further can be a token
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);

    sanitize_filename(&out)
}

/// Strip characters illegal in common filesystem names, collapse whitespace
/// runs, and trim; idempotent
pub fn sanitize_filename(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect();

    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut result: String = collapsed.chars().take(MAX_FILENAME_LEN).collect();
    while result.ends_with(['.', ' ']) {
        result.pop();
    }
    result
}

fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}h{:02}m{:02}s", hours, minutes, seconds)
    } else {
        format!("{}m{:02}s", minutes, seconds)
    }
}
