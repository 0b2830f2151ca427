//! Link identity rules used by the normalizer.
//!
//! Two bookmarks in one category are duplicates when their hrefs produce the
//! same [`link_key`]. The key is built from the parsed URL:
//!
//! | Part     | Treatment                                  |
//! |----------|--------------------------------------------|
//! | scheme   | significant, case-insensitive              |
//! | host     | significant, case-insensitive              |
//! | port     | significant unless it is the scheme default |
//! | path     | significant, case-sensitive                |
//! | query    | significant                                |
//! | fragment | ignored                                    |

use url::Url;

/// Human-readable summary of the duplicate rule
pub const DEDUP_KEY_POLICY: &str = "scheme + host + port + path + query; fragment ignored";

/// Parse an href into an absolute URL
pub fn parse_link(href: &str) -> Option<Url> {
    Url::parse(href.trim()).ok()
}

/// Duplicate-detection key for a parsed URL
pub fn link_key(url: &Url) -> String {
    let mut keyed = url.clone();
    keyed.set_fragment(None);
    // The url crate already lower-cases scheme and host and strips default ports
    keyed.to_string()
}

/// Title used when a bookmark has none: the host, else the link text itself
pub fn default_title(url: &Url, href: &str) -> String {
    match url.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => href.trim().to_string(),
    }
}
