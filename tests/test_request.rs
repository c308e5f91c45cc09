use minihttp::http::request::{canonical_header_key, Method, Request};
use std::collections::HashMap;

#[test]
fn test_request_header_retrieval() {
    let mut headers = HashMap::new();
    headers.insert("User-Agent".to_string(), "curl".to_string());
    headers.insert("Accept".to_string(), "*/*".to_string());

    let req = Request {
        method: Method::Get,
        url: "/index.html".to_string(),
        proto: "HTTP/1.1".to_string(),
        host: "website1".to_string(),
        close: false,
        headers,
        body: String::new(),
    };

    assert_eq!(req.header("User-Agent"), Some("curl"));
    assert_eq!(req.header("Accept"), Some("*/*"));
    assert_eq!(req.header("Missing"), None);
}

#[test]
fn test_method_tokens() {
    assert_eq!(Method::from_token("GET"), Some(Method::Get));
    assert_eq!(Method::Get.as_str(), "GET");

    for token in ["get", "Get", "POST", "HEAD", "PUT", "DELETE", ""] {
        assert_eq!(Method::from_token(token), None, "{token}");
    }
}

#[test]
fn test_canonical_header_key_capitalization() {
    assert_eq!(canonical_header_key("host"), "Host");
    assert_eq!(canonical_header_key("HOST"), "Host");
    assert_eq!(canonical_header_key("content-length"), "Content-Length");
    assert_eq!(canonical_header_key("x-forwarded-FOR"), "X-Forwarded-For");
    assert_eq!(canonical_header_key("Accept"), "Accept");
}

#[test]
fn test_canonical_header_key_edge_segments() {
    assert_eq!(canonical_header_key("-foo"), "-Foo");
    assert_eq!(canonical_header_key("foo--bar"), "Foo--Bar");
    assert_eq!(canonical_header_key("x-1st"), "X-1st");
}

#[test]
fn test_canonical_header_key_leaves_invalid_names_alone() {
    assert_eq!(canonical_header_key("host "), "host ");
    assert_eq!(canonical_header_key("bad name"), "bad name");
    assert_eq!(canonical_header_key("caf\u{e9}"), "caf\u{e9}");
}
