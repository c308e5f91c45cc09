use std::collections::HashMap;

/// The only protocol version the server speaks.
pub const HTTP_1_1: &str = "HTTP/1.1";

/// Document name appended to directory-style URLs.
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// HTTP request methods.
///
/// Only retrieval is supported, so the enum has a single variant. Any other
/// method token is rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
}

impl Method {
    /// Parses an HTTP method from its wire token.
    ///
    /// Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::Get));
    /// assert_eq!(Method::from_token("get"), None);
    /// assert_eq!(Method::from_token("POST"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::Get),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// A fully validated request.
///
/// Values of this type only come out of the parser when every check passed;
/// there is no partially filled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method
    pub method: Method,
    /// The request target, always starting with "/". Directory-style targets
    /// already have `index.html` appended.
    pub url: String,
    /// Protocol version, always "HTTP/1.1"
    pub proto: String,
    /// Value of the Host header, never empty
    pub host: String,
    /// Whether the client sent `Connection: close`
    pub close: bool,
    /// Remaining headers keyed by canonical name. Host and Connection are not
    /// stored here.
    pub headers: HashMap<String, String>,
    /// Unused for GET
    pub body: String,
}

impl Request {
    /// Retrieves a header value by canonical name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }
}

/// Canonicalizes a header name: the first letter and any letter following a
/// hyphen are upper-cased, everything else is lower-cased.
///
/// Names containing bytes that are not valid in a header token (spaces,
/// control characters, non-ASCII) are returned unchanged.
///
/// ```
/// # use minihttp::http::request::canonical_header_key;
/// assert_eq!(canonical_header_key("content-TYPE"), "Content-Type");
/// assert_eq!(canonical_header_key("host"), "Host");
/// assert_eq!(canonical_header_key("Host "), "Host ");
/// ```
pub fn canonical_header_key(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
