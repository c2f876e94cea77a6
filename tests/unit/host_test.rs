//! Host extraction over the URL shapes found in real history exports.

use rstest::rstest;
use visitstats::extract_host;

#[rstest]
#[case("https://news.example.com/a/b?x=1", "news.example.com")]
#[case("http://a.com", "a.com")]
#[case("https://example.com:8443/login", "example.com")]
#[case("ftp://user:pw@files.example.org/pub", "files.example.org")]
#[case("https://example.com#section", "example.com")]
#[case("http://[::1]:8080/status", "[::1]")]
#[case("chrome-extension://abcdef/popup.html", "abcdef")]
fn absolute_urls(#[case] url: &str, #[case] host: &str) {
    assert_eq!(extract_host(url), host);
}

#[rstest]
#[case("example.com/path?q=1", "example.com")]
#[case("Example.COM", "example.com")]
#[case("localhost:8080/health", "localhost")]
#[case("user:pw@intranet.local/wiki", "intranet.local")]
#[case("//cdn.example.net/lib.js", "cdn.example.net")]
#[case("[::1]:3000", "[::1]")]
fn scheme_less_urls(#[case] url: &str, #[case] host: &str) {
    assert_eq!(extract_host(url), host);
}

#[rstest]
#[case("")]
#[case("about:blank")]
#[case("data:text/html,<p>hi</p>")]
#[case("?only=query")]
#[case("#fragment")]
fn urls_without_a_host(#[case] url: &str) {
    assert_eq!(extract_host(url), "");
}

#[test]
fn extraction_is_deterministic() {
    let url = "https://user@sub.example.com:99/p";
    assert_eq!(extract_host(url), extract_host(url));
}
