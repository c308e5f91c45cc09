use std::future::Future;

use crate::http::request::Request;
use crate::http::response::Response;

/// Produces a response for a parsed request.
///
/// Implementations dispatch on [`Request::method`]. An `Err` means no
/// response could be built; the connection answers it with
/// 500 Internal Server Error and closes.
///
/// One handler value is shared by every connection task, so it must be
/// read-only after construction.
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, request: &Request) -> impl Future<Output = anyhow::Result<Response>> + Send;
}
