//! Static site serving
//!
//! This module maps Host headers to document roots and answers GET requests
//! with files from the selected root.

pub mod listing;
pub mod static_files;
pub mod vhost;

pub use static_files::StaticFiles;
pub use vhost::VirtualHosts;
