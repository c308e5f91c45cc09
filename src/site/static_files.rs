//! Static file serving
//!
//! [`StaticFiles`] is the [`Handler`] used by the server binary. A GET
//! request is answered from the document root its Host header selects:
//!
//! - unknown host, missing file, or a URL escaping the root: 404
//! - a directory: 301 to the same URL with a trailing slash
//! - a regular file: 200 with the file as body
//!
//! When directory listing is enabled, a directory-style URL whose
//! `index.html` is missing is answered with a generated index page instead
//! of 404.

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::http::handler::Handler;
use crate::http::request::{Method, Request, DEFAULT_DOCUMENT};
use crate::http::response::Response;
use crate::site::listing::dir_index_html;
use crate::site::vhost::VirtualHosts;

pub struct StaticFiles {
    hosts: VirtualHosts,
    directory_listing: bool,
}

impl StaticFiles {
    pub fn new(hosts: VirtualHosts, directory_listing: bool) -> Self {
        Self {
            hosts,
            directory_listing,
        }
    }

    /// Builds the handler from configuration, validating every document root.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let hosts = VirtualHosts::new(cfg.virtual_hosts.clone())?;
        Ok(Self::new(hosts, cfg.directory_listing))
    }

    pub fn hosts(&self) -> &VirtualHosts {
        &self.hosts
    }

    async fn get(&self, request: &Request) -> Result<Response> {
        let Some(root) = self.hosts.resolve(&request.host) else {
            info!(host = %request.host, "requested host is not served");
            return Ok(Response::not_found(&request.proto, request.close));
        };

        self.serve(root, request).await
    }

    /// Serves `request.url` from `root`.
    ///
    /// Only an unreadable file is an error; everything else maps to a
    /// response.
    pub async fn serve(&self, root: &Path, request: &Request) -> Result<Response> {
        let Some(path) = resolve_path(root, &request.url) else {
            warn!(url = %request.url, root = %root.display(), "rejected path outside document root");
            return Ok(Response::not_found(&request.proto, request.close));
        };

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) => {
                if self.directory_listing {
                    if let Some(response) = self.listing(&path, request).await? {
                        return Ok(response);
                    }
                }
                debug!(path = %path.display(), error = %e, "file not found");
                return Ok(Response::not_found(&request.proto, request.close));
            }
        };

        if metadata.is_dir() {
            let location = format!("{}/", request.url);
            return Ok(Response::moved_permanently(&request.proto, &location, request.close));
        }

        let body = tokio::fs::read(&path)
            .await
            .with_context(|| format!("failed reading {}", path.display()))?;

        let mut response = Response::ok(&request.proto)
            .header(
                "Content-Type",
                mime_guess::from_path(&path).first_or_octet_stream().to_string(),
            )
            .body(body)
            .close(request.close);

        if let Ok(modified) = metadata.modified() {
            response = response.header("Last-Modified", httpdate::fmt_http_date(modified));
        }

        Ok(response.build())
    }

    /// Index page for a directory URL whose default document is missing.
    async fn listing(&self, path: &Path, request: &Request) -> Result<Option<Response>> {
        let Some(dir_url) = request.url.strip_suffix(DEFAULT_DOCUMENT) else {
            return Ok(None);
        };
        if !dir_url.ends_with('/') {
            return Ok(None);
        }
        let Some(dir) = path.parent() else {
            return Ok(None);
        };

        match tokio::fs::metadata(dir).await {
            Ok(metadata) if metadata.is_dir() => {}
            _ => return Ok(None),
        }

        let html = dir_index_html(dir, dir_url)
            .await
            .with_context(|| format!("failed listing {}", dir.display()))?;

        Ok(Some(
            Response::ok(&request.proto)
                .header("Content-Type", "text/html; charset=utf-8")
                .body(html)
                .close(request.close)
                .build(),
        ))
    }
}

impl Handler for StaticFiles {
    async fn handle(&self, request: &Request) -> Result<Response> {
        match request.method {
            Method::Get => self.get(request).await,
        }
    }
}

/// Joins `url` onto `root`, resolving `.` and `..` lexically.
///
/// Returns `None` when the URL climbs above the root or the result is not
/// inside `root` component-wise.
pub fn resolve_path(root: &Path, url: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in url.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        // a segment must stay a single normal component
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => path.push(segment),
            _ => return None,
        }
    }

    if path.starts_with(root) {
        Some(path)
    } else {
        None
    }
}
