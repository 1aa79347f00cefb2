//! Response envelope building.
//!
//! Every completed call resolves to exactly one `(payload, meta)` pair: the
//! parsed body plus timing, byte counts, and status information. Error
//! outcomes are normalized into an [`ErrorPayload`] with a best-effort
//! `message` synthesized from the transport failure, the static status
//! description table, or a generic fallback.

use bytes::Bytes;

use crate::error::{status_description, Error, ErrorKind, ErrorPayload};
use crate::transport::{TransportFailure, TransportResponse};

/// Normalized success result of one call.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Parsed response body.
    pub payload: Payload,
    /// Call metadata.
    pub meta: ResponseMeta,
}

/// Parsed response body.
#[derive(Debug, Clone)]
pub enum Payload {
    /// `application/json` body. Unparseable or empty JSON bodies collapse to
    /// an empty object.
    Json(serde_json::Value),
    /// `application/xml` / `text/xml` body.
    Xml(XmlElement),
    /// Anything else, e.g. blob field content.
    Bytes(Bytes),
}

impl Payload {
    /// The parsed JSON value, if this is a JSON payload.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The parsed XML document, if this is an XML payload.
    pub fn as_xml(&self) -> Option<&XmlElement> {
        match self {
            Payload::Xml(element) => Some(element),
            _ => None,
        }
    }

    /// The raw bytes, if this payload was not parsed.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Metadata describing one HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseMeta {
    /// Request URL. Empty for validation failures.
    pub url: String,
    /// Request body size in bytes.
    pub bytes_sent: usize,
    /// Response body size in bytes.
    pub bytes_received: usize,
    /// Elapsed time of the exchange in milliseconds.
    pub time_ms: u64,
    /// Response Content-Type.
    pub content_type: Option<String>,
    /// HTTP status code. 0 when no exchange happened.
    pub status: u16,
    /// Status line, e.g. `HTTP/1.1 200 OK`.
    pub status_text: String,
}

/// Build the success envelope for a completed 2xx exchange.
pub(crate) fn success_envelope(
    url: &str,
    bytes_sent: usize,
    time_ms: u64,
    response: TransportResponse,
) -> Envelope {
    let payload = parse_body(response.content_type.as_deref(), &response.body);
    Envelope {
        payload,
        meta: ResponseMeta {
            url: url.to_string(),
            bytes_sent,
            bytes_received: response.body.len(),
            time_ms,
            content_type: response.content_type,
            status: response.status,
            status_text: response.status_text,
        },
    }
}

/// Build the error for a completed non-2xx exchange.
pub(crate) fn http_error(
    url: &str,
    bytes_sent: usize,
    time_ms: u64,
    response: TransportResponse,
) -> Error {
    let payload = error_payload(
        response.status,
        response.content_type.as_deref(),
        &response.body,
        None,
        None,
    );
    let meta = ResponseMeta {
        url: url.to_string(),
        bytes_sent,
        bytes_received: response.body.len(),
        time_ms,
        content_type: response.content_type,
        status: response.status,
        status_text: response.status_text,
    };
    Error::with_payload(
        ErrorKind::Transport {
            status: response.status,
            message: payload.message.clone(),
        },
        payload,
        meta,
    )
}

/// Build the error for a transport-level failure (network, timeout, DNS).
pub(crate) fn failure_error(
    url: &str,
    bytes_sent: usize,
    time_ms: u64,
    failure: TransportFailure,
) -> Error {
    let status = failure.status.unwrap_or(0);
    let body = failure.partial_body.clone().unwrap_or_default();
    let payload = error_payload(
        status,
        None,
        &body,
        Some(&failure.message),
        failure.code.as_deref(),
    );
    let meta = ResponseMeta {
        url: url.to_string(),
        bytes_sent,
        bytes_received: body.len(),
        time_ms,
        content_type: None,
        status,
        status_text: failure.status_text.unwrap_or_else(|| "ERROR".to_string()),
    };
    Error::with_payload(
        ErrorKind::Transport {
            status,
            message: payload.message.clone(),
        },
        payload,
        meta,
    )
}

/// Parse a response body according to its content type.
fn parse_body(content_type: Option<&str>, body: &Bytes) -> Payload {
    let ct = content_type.unwrap_or("").to_ascii_lowercase();
    if ct.contains("application/json") {
        if body.is_empty() {
            return Payload::Json(serde_json::Value::Object(Default::default()));
        }
        match serde_json::from_slice(body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Json(serde_json::Value::Object(Default::default())),
        }
    } else if ct.contains("application/xml") || ct.contains("text/xml") {
        match std::str::from_utf8(body).ok().and_then(|s| parse_xml(s).ok()) {
            Some(element) => Payload::Xml(element),
            None => Payload::Bytes(body.clone()),
        }
    } else {
        Payload::Bytes(body.clone())
    }
}

/// Normalize an error body into an [`ErrorPayload`].
///
/// Array bodies (the Salesforce REST error format) contribute their first
/// element. The `message` falls back, in order, to the transport failure
/// message, the static status description, and a generic string.
fn error_payload(
    status: u16,
    content_type: Option<&str>,
    body: &Bytes,
    transport_message: Option<&str>,
    transport_code: Option<&str>,
) -> ErrorPayload {
    let parsed: Option<serde_json::Value> = if body.is_empty() {
        None
    } else if content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(true)
    {
        serde_json::from_slice(body).ok()
    } else {
        None
    };

    let value = match parsed {
        Some(serde_json::Value::Array(mut items)) if !items.is_empty() => Some(items.remove(0)),
        Some(serde_json::Value::Array(_)) => None,
        other => other,
    };

    let mut payload: ErrorPayload = value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let details = status_description(status);
    if payload.error_code.is_none() {
        payload.error_code = transport_code.map(String::from);
    }
    if payload.details.is_none() {
        payload.details = details.map(String::from);
    }
    if payload.message.is_empty() {
        payload.message = transport_message
            .filter(|m| !m.is_empty())
            .map(String::from)
            .or_else(|| details.map(String::from))
            .unwrap_or_else(|| "HTTP/S request failed".to_string());
    }
    payload
}

/// One element of a parsed XML response body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content of this element.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Find the first direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Parse an XML document into an element tree.
pub fn parse_xml(text: &str) -> std::result::Result<XmlElement, quick_xml::Error> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    fn element_from(
        e: &quick_xml::events::BytesStart<'_>,
    ) -> std::result::Result<XmlElement, quick_xml::Error> {
        let mut element = XmlElement {
            name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
            ..XmlElement::default()
        };
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            element.attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                attr.unescape_value()?.into_owned(),
            ));
        }
        Ok(element)
    }

    fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => {
                if root.is_none() {
                    *root = Some(element);
                }
            }
        }
    }

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(element_from(&e)?),
            Event::Empty(e) => {
                let element = element_from(&e)?;
                attach(&mut stack, &mut root, element);
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape()?;
                    top.text.push_str(text.trim());
                }
            }
            Event::CData(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text
                        .push_str(String::from_utf8_lossy(t.as_ref()).trim());
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    attach(&mut stack, &mut root, element);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    root.ok_or_else(|| quick_xml::Error::Io(std::sync::Arc::new(std::io::Error::other("empty XML document"))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, content_type: &str, body: impl Into<Bytes>) -> TransportResponse {
        TransportResponse {
            status,
            status_text: format!("HTTP/1.1 {status}"),
            content_type: Some(content_type.to_string()),
            body: body.into(),
        }
    }

    #[test]
    fn test_success_envelope_parses_json() {
        let envelope = success_envelope(
            "https://na1.salesforce.com/services/data/",
            0,
            12,
            response(200, "application/json; charset=utf-8", r#"{"done":true}"#),
        );
        assert_eq!(
            envelope.payload.as_json().unwrap()["done"],
            serde_json::json!(true)
        );
        assert_eq!(envelope.meta.status, 200);
        assert_eq!(envelope.meta.bytes_received, 13);
        assert_eq!(envelope.meta.time_ms, 12);
    }

    #[test]
    fn test_unparseable_json_collapses_to_empty_object() {
        let envelope = success_envelope("u", 0, 0, response(200, "application/json", "not json"));
        assert_eq!(
            envelope.payload.as_json().unwrap(),
            &serde_json::json!({})
        );
    }

    #[test]
    fn test_unknown_content_type_is_raw_bytes() {
        let envelope = success_envelope("u", 0, 0, response(200, "image/png", &b"\x89PNG"[..]));
        assert_eq!(envelope.payload.as_bytes().unwrap().len(), 4);
    }

    #[test]
    fn test_xml_body_parses_to_tree() {
        let xml = r#"<Account><Name>Acme</Name><Fields a="1"/></Account>"#;
        let envelope = success_envelope("u", 0, 0, response(200, "application/xml", xml));
        let root = envelope.payload.as_xml().unwrap();
        assert_eq!(root.name, "Account");
        assert_eq!(root.child("Name").unwrap().text, "Acme");
        assert_eq!(
            root.child("Fields").unwrap().attributes,
            vec![("a".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_http_error_takes_first_array_element() {
        let body = r#"[{"message":"Session expired or invalid","errorCode":"INVALID_SESSION_ID"}]"#;
        let err = http_error("u", 0, 5, response(401, "application/json", body));
        assert_eq!(err.payload.message, "Session expired or invalid");
        assert_eq!(err.payload.error_code.as_deref(), Some("INVALID_SESSION_ID"));
        assert_eq!(
            err.payload.details.as_deref(),
            status_description(401)
        );
        assert!(matches!(err.kind, ErrorKind::Transport { status: 401, .. }));
    }

    #[test]
    fn test_http_error_message_falls_back_to_status_table() {
        let err = http_error("u", 0, 0, response(404, "application/json", ""));
        assert_eq!(err.payload.message, "404: Resource not found.");
        assert_eq!(err.meta.status, 404);
    }

    #[test]
    fn test_http_error_generic_fallback() {
        let err = http_error("u", 0, 0, response(502, "application/json", ""));
        assert_eq!(err.payload.message, "HTTP/S request failed");
    }

    #[test]
    fn test_failure_error_uses_transport_message_and_code() {
        let failure = TransportFailure {
            code: Some("timeout".to_string()),
            status: None,
            status_text: None,
            message: "operation timed out".to_string(),
            partial_body: None,
        };
        let err = failure_error("u", 10, 5000, failure);
        assert_eq!(err.payload.message, "operation timed out");
        assert_eq!(err.payload.error_code.as_deref(), Some("timeout"));
        assert_eq!(err.meta.status, 0);
        assert_eq!(err.meta.status_text, "ERROR");
        assert_eq!(err.meta.bytes_sent, 10);
    }

    #[test]
    fn test_parse_xml_nested() {
        let root = parse_xml("<a><b><c>deep</c></b><b>two</b></a>").unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.child("b").unwrap().child("c").unwrap().text, "deep");
    }

    #[test]
    fn test_parse_xml_rejects_garbage() {
        assert!(parse_xml("").is_err());
    }
}
