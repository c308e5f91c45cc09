use std::collections::BTreeMap;
use std::time::SystemTime;

use crate::http::request::HTTP_1_1;

/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File served
/// - `MovedPermanently` (301): Directory requested without a trailing slash
/// - `BadRequest` (400): Malformed or incomplete request
/// - `NotFound` (404): Unknown host, missing file, or a path outside the document root
/// - `InternalServerError` (500): The handler could not produce a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 301 Moved permanently
    MovedPermanently,
    /// 400 Bad request
    BadRequest,
    /// 404 Not found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::MovedPermanently => 301,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the status text written on the status line.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved permanently",
            StatusCode::BadRequest => "Bad request",
            StatusCode::NotFound => "Not found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Responses are only produced through [`ResponseBuilder::build`], which
/// keeps `Content-Length` equal to the body length. Headers live in an
/// ordered map so the serialized form is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Protocol version written on the status line
    pub proto: String,
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub headers: BTreeMap<String, String>,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use minihttp::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/plain")
///     .body(b"hi".to_vec())
///     .close(true)
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// assert!(response.is_close());
/// ```
pub struct ResponseBuilder {
    proto: String,
    status: StatusCode,
    headers: BTreeMap<String, String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Creates a new response builder for `HTTP/1.1` with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            proto: HTTP_1_1.to_string(),
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Sets the protocol version echoed on the status line.
    pub fn proto(mut self, proto: impl Into<String>) -> Self {
        self.proto = proto.into();
        self
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adds `Connection: close` when `close` is set, removes it otherwise.
    pub fn close(mut self, close: bool) -> Self {
        if close {
            self.headers.insert("Connection".to_string(), "close".to_string());
        } else {
            self.headers.remove("Connection");
        }
        self
    }

    /// Builds the final Response.
    ///
    /// `Content-Length` is always set from the body, replacing any value a
    /// caller supplied.
    pub fn build(mut self) -> Response {
        self.headers
            .insert("Content-Length".to_string(), self.body.len().to_string());

        Response {
            proto: self.proto,
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Starts a 200 OK response with the `Date` header attached.
    ///
    /// The caller supplies the body and the serving headers.
    pub fn ok(proto: &str) -> ResponseBuilder {
        ResponseBuilder::new(StatusCode::Ok)
            .proto(proto)
            .header("Date", httpdate::fmt_http_date(SystemTime::now()))
    }

    /// Creates a 301 Moved Permanently response pointing at `location`.
    pub fn moved_permanently(proto: &str, location: &str, close: bool) -> Self {
        ResponseBuilder::new(StatusCode::MovedPermanently)
            .proto(proto)
            .header("Location", location)
            .close(close)
            .build()
    }

    /// Creates a 400 Bad Request response. It always closes the connection.
    pub fn bad_request(proto: &str) -> Self {
        ResponseBuilder::new(StatusCode::BadRequest)
            .proto(proto)
            .close(true)
            .build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(proto: &str, close: bool) -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .proto(proto)
            .close(close)
            .build()
    }

    /// Creates a 500 Internal Server Error response. It always closes the connection.
    pub fn internal_error(proto: &str) -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .proto(proto)
            .close(true)
            .build()
    }

    /// Retrieves a header value by name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Whether the connection must be closed after this response is written.
    pub fn is_close(&self) -> bool {
        self.header("Connection") == Some("close")
    }
}
