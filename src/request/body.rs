//! Request body detection and parsing
//!
//! Captured bodies arrive as plain text. Detection runs an ordered table of
//! `(predicate, parser)` pairs: multipart first, then JSON, then URL-encoded.

use content_disposition::parse_content_disposition;
use indexmap::IndexMap;
use mime::Mime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::strings::truncate_str;

/// Stand-in for file contents, never embedded verbatim in generated code
pub const FILE_PLACEHOLDER: &str = "(binary)";

/// Marker Chromium-based browsers put in every multipart boundary
const WEBKIT_BOUNDARY: &str = "------WebKitFormBoundary";

/// A file part of a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    pub filename: String,
    pub content: String,
    pub content_type: Option<String>,
}

impl FileField {
    pub fn new(filename: impl Into<String>, content_type: Option<String>) -> Self {
        Self {
            filename: filename.into(),
            content: FILE_PLACEHOLDER.to_string(),
            content_type,
        }
    }
}

/// Parsed request body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    None,
    Json(Value),
    Form(IndexMap<String, String>),
    Multipart {
        files: IndexMap<String, FileField>,
        fields: IndexMap<String, String>,
    },
}

impl Body {
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// Detect the encoding of `text` and parse it
    ///
    /// `content_type` is the request's Content-Type header, if known.
    pub fn parse(text: &str, content_type: Option<&str>) -> Body {
        if text.trim().is_empty() {
            return Body::None;
        }

        let normalized = text.replace("\r\n", "\n");
        let source = BodySource {
            text: &normalized,
            content_type: content_type.and_then(|ct| ct.parse::<Mime>().ok()),
        };

        for (kind, detect, parse) in DETECTORS {
            if detect(&source) {
                if let Some(body) = parse(&source) {
                    debug!(kind = %kind, "Parsed request body");
                    return body;
                }
            }
        }

        warn!(body = %truncate_str(text, 80), "Unrecognized body encoding, dropping body");
        Body::None
    }
}

struct BodySource<'a> {
    text: &'a str,
    content_type: Option<Mime>,
}

type Detector = fn(&BodySource) -> bool;
type Parser = fn(&BodySource) -> Option<Body>;

const DETECTORS: &[(&str, Detector, Parser)] = &[
    ("multipart", is_multipart, parse_multipart),
    ("json", is_json, parse_json),
    ("urlencoded", is_urlencoded, parse_urlencoded),
];

fn is_multipart(source: &BodySource) -> bool {
    let declared = source
        .content_type
        .as_ref()
        .is_some_and(|ct| ct.type_() == mime::MULTIPART && ct.subtype() == mime::FORM_DATA);
    declared || source.text.contains(WEBKIT_BOUNDARY)
}

fn parse_multipart(source: &BodySource) -> Option<Body> {
    let boundary = source
        .content_type
        .as_ref()
        .and_then(|ct| ct.get_param(mime::BOUNDARY))
        .map(|b| b.as_str().to_string())
        .or_else(|| {
            source
                .text
                .trim_start()
                .lines()
                .next()
                .and_then(|line| line.trim_end().strip_prefix("--"))
                .map(String::from)
        })?;
    let delimiter = format!("--{}", boundary);

    let mut files = IndexMap::new();
    let mut fields = IndexMap::new();

    for part in source.text.split(delimiter.as_str()) {
        let part = part.strip_prefix('\n').unwrap_or(part);
        if part.trim().is_empty() || part.starts_with("--") {
            continue;
        }

        let (head, content) = part.split_once("\n\n").unwrap_or((part, ""));
        let content = content.strip_suffix('\n').unwrap_or(content);

        let mut disposition = None;
        let mut part_type = None;
        for line in head.lines() {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            if name.trim().eq_ignore_ascii_case("content-disposition") {
                disposition = Some(parse_content_disposition(value.trim()));
            } else if name.trim().eq_ignore_ascii_case("content-type") {
                part_type = Some(value.trim().to_string());
            }
        }

        let Some(disposition) = disposition else {
            debug!("Skipping multipart part without Content-Disposition");
            continue;
        };
        let Some(name) = disposition.name() else {
            debug!("Skipping multipart part without a name");
            continue;
        };

        // an empty file input is sent with `filename=""`
        match disposition.filename_full().filter(|f| !f.is_empty()) {
            Some(filename) => {
                files.insert(name, FileField::new(filename, part_type));
            }
            None => {
                fields.entry(name).or_insert_with(|| content.to_string());
            }
        }
    }

    if files.is_empty() && fields.is_empty() {
        return None;
    }
    Some(Body::Multipart { files, fields })
}

fn is_json(source: &BodySource) -> bool {
    serde_json::from_str::<Value>(source.text).is_ok()
}

fn parse_json(source: &BodySource) -> Option<Body> {
    match serde_json::from_str::<Value>(source.text).ok()? {
        Value::Null => Some(Body::Json(Value::Object(Default::default()))),
        value => Some(Body::Json(value)),
    }
}

fn is_urlencoded(source: &BodySource) -> bool {
    let text = source.text.trim();
    text.contains('=') && text.split('&').all(|pair| pair.contains('='))
}

fn parse_urlencoded(source: &BodySource) -> Option<Body> {
    Some(Body::Form(super::url::parse_query(source.text.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MULTIPART: &str = "------WebKitFormBoundaryAbC123\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\
\r\n\
hello world\r\n\
------WebKitFormBoundaryAbC123\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"notes.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
secret file contents\r\n\
------WebKitFormBoundaryAbC123\r\n\
Content-Type: text/plain\r\n\
\r\n\
orphan\r\n\
------WebKitFormBoundaryAbC123--\r\n";

    #[test]
    fn test_json_body() {
        let body = Body::parse(r#"{"a": 1, "b": [true, null]}"#, None);
        assert_eq!(body, Body::Json(json!({"a": 1, "b": [true, null]})));
    }

    #[test]
    fn test_null_json_is_empty_object() {
        assert_eq!(Body::parse("null", None), Body::Json(json!({})));
    }

    #[test]
    fn test_urlencoded_body() {
        let body = Body::parse("a=1&b=x%3Dy&a=2&token=abc==", None);
        let Body::Form(form) = body else {
            panic!("expected form body");
        };
        assert_eq!(form["a"], "1");
        assert_eq!(form["b"], "x=y");
        assert_eq!(form["token"], "abc==");
        assert_eq!(form.len(), 3);
    }

    #[test]
    fn test_unrecognized_body_is_none() {
        assert_eq!(Body::parse("just some text", None), Body::None);
        assert_eq!(Body::parse("a=1&broken", None), Body::None);
        assert_eq!(Body::parse("", None), Body::None);
    }

    #[test]
    fn test_multipart_from_marker() {
        let Body::Multipart { files, fields } = Body::parse(MULTIPART, None) else {
            panic!("expected multipart body");
        };
        assert_eq!(fields.get("title").map(String::as_str), Some("hello world"));
        assert_eq!(
            files.get("upload"),
            Some(&FileField::new("notes.txt", Some("text/plain".to_string())))
        );
        assert_eq!(files["upload"].content, FILE_PLACEHOLDER);
        assert_eq!(fields.len() + files.len(), 2);
    }

    #[test]
    fn test_multipart_from_content_type() {
        let text = "--xyz\nContent-Disposition: form-data; name=\"k\"\n\nv\n--xyz--\n";
        let body = Body::parse(text, Some("multipart/form-data; boundary=xyz"));
        let Body::Multipart { files, fields } = body else {
            panic!("expected multipart body");
        };
        assert!(files.is_empty());
        assert_eq!(fields["k"], "v");
    }

    #[test]
    fn test_multipart_empty_filename_is_field() {
        let text = "--xyz\r\n\
Content-Disposition: form-data; name=\"upload\"; filename=\"\"\r\n\
Content-Type: application/octet-stream\r\n\
\r\n\
\r\n\
--xyz--\r\n";
        let Body::Multipart { files, fields } = Body::parse(text, Some("multipart/form-data; boundary=xyz")) else {
            panic!("expected multipart body");
        };
        assert!(files.is_empty());
        assert_eq!(fields.get("upload").map(String::as_str), Some(""));
    }
}
