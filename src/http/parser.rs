use crate::http::request::{canonical_header_key, Method, Request, DEFAULT_DOCUMENT, HTTP_1_1};
use std::collections::HashMap;

const CRLF: &[u8] = b"\r\n";

/// A frame that could not be turned into a [`Request`].
///
/// `method` and `url` hold whatever was recognized before the failure, so
/// they may be empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid request: {method} {url} {description}")]
pub struct InvalidRequest {
    pub method: String,
    pub url: String,
    pub description: String,
}

impl InvalidRequest {
    fn new(method: &str, url: &str, description: impl Into<String>) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            description: description.into(),
        }
    }
}

/// Returns the offset of the first blank-line terminator (`\r\n\r\n`).
///
/// The frame passed to [`parse_request`] is `buf[..end + 2]`, and the whole
/// frame including the blank line occupies `buf[..end + 4]`.
pub fn find_frame_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

enum LineState {
    StartLine,
    Header,
}

/// Fields collected while walking the frame.
#[derive(Default)]
struct Partial {
    method: Option<Method>,
    url: String,
    proto: String,
    host: String,
    close: bool,
    headers: HashMap<String, String>,
}

impl Partial {
    fn method_str(&self) -> &'static str {
        self.method.map(|m| m.as_str()).unwrap_or("")
    }
}

/// Parses one request frame: the start line and header lines, each
/// terminated by CRLF, without the final blank line.
///
/// The frame is walked as raw bytes. Only the start line and the Host value
/// must be UTF-8; other header values are kept lossily.
pub fn parse_request(frame: &[u8]) -> Result<Request, InvalidRequest> {
    let mut partial = Partial::default();
    let mut state = LineState::StartLine;
    let mut rest = frame;

    while let Some(idx) = find_crlf(rest) {
        let line = &rest[..idx];
        rest = &rest[idx + CRLF.len()..];

        state = match state {
            LineState::StartLine => {
                parse_start_line(line, &mut partial)?;
                LineState::Header
            }
            LineState::Header => {
                parse_header_line(line, &mut partial)?;
                LineState::Header
            }
        };
    }

    if partial.host.is_empty() {
        return Err(InvalidRequest::new(partial.method_str(), &partial.url, "unspecified host"));
    }

    if !rest.is_empty() {
        return Err(InvalidRequest::new(
            partial.method_str(),
            &partial.url,
            format!("incomplete request, remaining: {}", String::from_utf8_lossy(rest)),
        ));
    }

    let method = partial
        .method
        .ok_or_else(|| InvalidRequest::new("", "", "missing start line"))?;

    Ok(Request {
        method,
        url: partial.url,
        proto: partial.proto,
        host: partial.host,
        close: partial.close,
        headers: partial.headers,
        body: String::new(),
    })
}

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

fn trim_spaces(mut value: &[u8]) -> &[u8] {
    while let [b' ', tail @ ..] = value {
        value = tail;
    }
    while let [head @ .., b' '] = value {
        value = head;
    }
    value
}

/// Splits a start line on single spaces into exactly three tokens.
fn split_start_line(line: &str) -> Option<(&str, &str, &str)> {
    let mut tokens = line.split(' ');
    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(target), Some(proto), None) => Some((method, target, proto)),
        _ => None,
    }
}

fn parse_start_line(line: &[u8], partial: &mut Partial) -> Result<(), InvalidRequest> {
    let line =
        std::str::from_utf8(line).map_err(|_| InvalidRequest::new("", "", "invalid encoding"))?;
    let (method, target, proto) = split_start_line(line)
        .ok_or_else(|| InvalidRequest::new("", "", format!("malformed start line: {line}")))?;

    partial.method = Some(
        Method::from_token(method)
            .ok_or_else(|| InvalidRequest::new(method, target, "unsupported method"))?,
    );

    if !target.starts_with('/') {
        return Err(InvalidRequest::new(method, target, "invalid URL"));
    }
    partial.url = if target.ends_with('/') {
        format!("{target}{DEFAULT_DOCUMENT}")
    } else {
        target.to_string()
    };

    if proto != HTTP_1_1 {
        return Err(InvalidRequest::new(method, &partial.url, proto));
    }
    partial.proto = proto.to_string();

    Ok(())
}

fn parse_header_line(line: &[u8], partial: &mut Partial) -> Result<(), InvalidRequest> {
    let (name, value) = match line.iter().position(|&b| b == b':') {
        Some(colon) if colon > 0 => (&line[..colon], &line[colon + 1..]),
        _ => {
            return Err(InvalidRequest::new(
                partial.method_str(),
                &partial.url,
                format!("invalid header: {}", String::from_utf8_lossy(line)),
            ));
        }
    };

    let name = canonical_header_key(&String::from_utf8_lossy(name));
    let value = trim_spaces(value);

    match name.as_str() {
        "Host" => {
            partial.host = std::str::from_utf8(value)
                .map_err(|_| {
                    InvalidRequest::new(partial.method_str(), &partial.url, "invalid encoding")
                })?
                .to_string();
        }
        "Connection" => partial.close = value == b"close",
        _ => {
            partial
                .headers
                .insert(name, String::from_utf8_lossy(value).into_owned());
        }
    }

    Ok(())
}
