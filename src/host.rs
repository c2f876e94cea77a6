use regex::Regex;
use std::sync::OnceLock;
use tracing::trace;
use url::Url;

// Optional `scheme://`, optional `userinfo@`, then a bracketed IPv6 literal or
// everything up to the port, path, query or fragment.
const AUTHORITY_PATTERN: &str =
    r"^(?:(?:[A-Za-z][A-Za-z0-9+.\-]*:)?//)?(?:[^@/?#]*@)?(\[[^\]]*\]|[^:/?#]*)";

fn authority_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(AUTHORITY_PATTERN).ok())
        .as_ref()
}

/// Returns the host of `url`, or an empty string when none can be found.
///
/// Absolute URLs are handled by the `url` crate. Scheme-less input such as
/// `example.com/path`, `localhost:8080` or `user:pw@host/x` falls back to a
/// lenient authority match, so this never fails.
pub fn extract_host(url: &str) -> String {
    let url = url.trim();

    match Url::parse(url) {
        Ok(parsed) => {
            if let Some(host) = parsed.host_str() {
                return host.to_string();
            }
            // `host:8080` and `user:pw@host` parse as opaque URLs with a bogus scheme
            if parsed.cannot_be_a_base() && looks_like_authority(url) {
                return fallback_host(url);
            }
            String::new()
        }
        Err(e) => {
            trace!(action = "fallback", component = "host_extraction", url = url, error = %e, "URL did not parse, using lenient match");
            fallback_host(url)
        }
    }
}

fn looks_like_authority(url: &str) -> bool {
    let Some((_, rest)) = url.split_once(':') else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    rest.starts_with(|c: char| c.is_ascii_digit()) || authority.contains('@')
}

fn fallback_host(url: &str) -> String {
    authority_pattern()
        .and_then(|pattern| pattern.captures(url))
        .and_then(|captures| captures.get(1))
        .map(|host| host.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}
