//! HTML directory index pages.

use std::io;
use std::path::Path;

use url::form_urlencoded::byte_serialize;

/// Renders an HTML page listing the entries of `dir`, sorted by name.
///
/// Links are form-urlencoded entry names; directories get a trailing slash
/// both in the link and in the label.
pub async fn dir_index_html(dir: &Path, title: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry.file_type().await?.is_dir();
        entries.push((name, is_dir));
    }
    entries.sort();

    let title = escape_html(title);
    let mut html = String::new();
    html.push_str("<html>\n<head>\n");
    html.push_str("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=utf-8\">\n");
    html.push_str(&format!("<title>Directory listing for {title}</title>\n</head>\n"));
    html.push_str(&format!("<body>\n<h1>Directory listing for {title}</h1>\n<hr>\n<ul>\n"));

    for (name, is_dir) in entries {
        let mut href: String = byte_serialize(name.as_bytes()).collect();
        let mut label = escape_html(&name);
        if is_dir {
            href.push('/');
            label.push('/');
        }
        html.push_str(&format!("<li><a href=\"{href}\">{label}</a></li>\n"));
    }

    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
