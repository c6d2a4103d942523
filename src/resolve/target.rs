//! Origin URL construction.
//!
//! # Responsibilities
//! - Combine scheme, host, resource path, and query into an absolute URL
//! - Collapse runs of slashes in the path (the `://` stays untouched)
//!
//! # Design Decisions
//! - Pure function; malformed hosts are rejected upstream by the resolver
//! - The query string is appended verbatim

/// Build the absolute origin URL for a resolved target.
///
/// The resource path is normalized so that any run of slashes after the
/// authority collapses to a single one; `query` must be either empty or
/// carry its leading `?`.
pub fn build_target_url(
    scheme: &str,
    host: &str,
    port: Option<u16>,
    resource_path: &str,
    query: &str,
) -> String {
    let mut url = String::with_capacity(
        scheme.len() + 3 + host.len() + 6 + resource_path.len() + query.len() + 1,
    );
    url.push_str(scheme);
    url.push_str("://");
    url.push_str(host);
    if let Some(port) = port {
        url.push(':');
        url.push_str(&port.to_string());
    }

    url.push('/');
    let mut previous_was_slash = true;
    for c in resource_path.chars() {
        if c == '/' {
            if !previous_was_slash {
                url.push('/');
            }
            previous_was_slash = true;
        } else {
            url.push(c);
            previous_was_slash = false;
        }
    }

    url.push_str(query);
    url
}
