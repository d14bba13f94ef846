//! Sub-task and attachment lists
//!
//! Both lists are stored locally as structured JSON. The backend still speaks
//! a legacy delimiter format, so this module also carries a lenient codec for
//! it:
//!
//! - sub-tasks: `- [ ] first[end] - [x] second`
//! - attachments: `name|url[end]url`
//!
//! Decoding never fails; malformed input degrades to whatever entries can be
//! recovered.

use serde::{Deserialize, Serialize};

const ENTRY_SEPARATOR: &str = "[end]";
const DONE_MARKER: &str = "[x]";
const OPEN_MARKER: &str = "[ ]";

/// A checklist item nested under a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub title: String,
    pub complete: bool,
}

impl SubTask {
    #[must_use]
    pub fn new(title: impl Into<String>, complete: bool) -> Self {
        Self {
            title: title.into(),
            complete,
        }
    }
}

/// A file or link attached to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

impl Attachment {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Decode the legacy sub-task string.
///
/// # Examples
///
/// ```
/// use todosync_core::models::decode_subtasks;
///
/// let items = decode_subtasks("- [ ] milk[end] - [x] eggs");
/// assert_eq!(items.len(), 2);
/// assert!(!items[0].complete);
/// assert!(items[1].complete);
/// ```
#[must_use]
pub fn decode_subtasks(raw: &str) -> Vec<SubTask> {
    raw.split(ENTRY_SEPARATOR)
        .filter_map(|entry| {
            let entry = entry.trim();
            let body = entry.strip_prefix('-').map_or(entry, str::trim_start);
            let (complete, title) = split_marker(body);
            let title = title.trim();
            if title.is_empty() {
                None
            } else {
                Some(SubTask::new(title, complete))
            }
        })
        .collect()
}

/// Encode sub-tasks into the legacy string.
#[must_use]
pub fn encode_subtasks(items: &[SubTask]) -> String {
    items
        .iter()
        .map(|item| {
            let marker = if item.complete {
                DONE_MARKER
            } else {
                OPEN_MARKER
            };
            format!("- {marker} {}", sanitize(&item.title))
        })
        .collect::<Vec<_>>()
        .join("[end] ")
}

/// Decode the legacy attachment string.
#[must_use]
pub fn decode_attachments(raw: &str) -> Vec<Attachment> {
    raw.split(ENTRY_SEPARATOR)
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            if let Some((name, url)) = entry.split_once('|') {
                let url = url.trim();
                if url.is_empty() {
                    return None;
                }
                let name = name.trim();
                let name = if name.is_empty() {
                    name_from_url(url)
                } else {
                    name.to_string()
                };
                return Some(Attachment::new(name, url));
            }
            Some(Attachment::new(name_from_url(entry), entry))
        })
        .collect()
}

/// Encode attachments into the legacy string.
#[must_use]
pub fn encode_attachments(items: &[Attachment]) -> String {
    items
        .iter()
        .map(|item| format!("{}|{}", sanitize(&item.name), sanitize(&item.url)))
        .collect::<Vec<_>>()
        .join(ENTRY_SEPARATOR)
}

fn split_marker(body: &str) -> (bool, &str) {
    let mut chars = body.char_indices();
    if let (Some((_, '[')), Some((_, mark)), Some((_, ']'))) =
        (chars.next(), chars.next(), chars.next())
    {
        // All three bytes are ASCII here, so byte offset 3 is a char boundary.
        match mark {
            'x' | 'X' => return (true, &body[3..]),
            ' ' => return (false, &body[3..]),
            _ => {}
        }
    }
    (false, body)
}

fn name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(url)
        .to_string()
}

fn sanitize(value: &str) -> String {
    value.replace(ENTRY_SEPARATOR, "").replace('|', "/")
}
