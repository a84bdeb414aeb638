//! Twitter/X link canonicalization.
//!
//! Rewrites `twitter.com` / `x.com` links to a mirror host that renders
//! embeds properly in Telegram, preserving path, query, and fragment.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

/// Matches twitter.com and x.com URLs, with or without `www.`.
static TWITTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:twitter\.com|x\.com)/[^\s]+").expect("valid regex")
});

/// Mirror host used when none is configured.
pub const DEFAULT_MIRROR_HOST: &str = "fxtwitter.com";

/// Rewrite every Twitter/X link in `text` to `mirror_host`.
///
/// Path, query, and fragment are preserved verbatim. Text without matches is
/// returned unchanged, and a match that fails to parse as a URL keeps its
/// original substring.
pub fn rewrite_links(text: &str, mirror_host: &str) -> String {
    TWITTER_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let original = &caps[0];
            match Url::parse(original) {
                Ok(url) => {
                    let mut rewritten = format!("https://{mirror_host}{}", url.path());
                    if let Some(query) = url.query() {
                        rewritten.push('?');
                        rewritten.push_str(query);
                    }
                    if let Some(fragment) = url.fragment() {
                        rewritten.push('#');
                        rewritten.push_str(fragment);
                    }
                    debug!("rewrote link {original} -> {rewritten}");
                    rewritten
                }
                Err(e) => {
                    debug!("keeping unparseable link {original}: {e}");
                    original.to_string()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_x_com_status() {
        let out = rewrite_links("check https://x.com/foo/status/1", DEFAULT_MIRROR_HOST);
        assert_eq!(out, "check https://fxtwitter.com/foo/status/1");
    }

    #[test]
    fn test_rewrite_twitter_com_with_www() {
        let out = rewrite_links(
            "https://www.twitter.com/user/status/123",
            DEFAULT_MIRROR_HOST,
        );
        assert_eq!(out, "https://fxtwitter.com/user/status/123");
    }

    #[test]
    fn test_rewrite_preserves_query_and_fragment() {
        let out = rewrite_links(
            "https://x.com/a/status/9?s=20&t=abc#frag",
            DEFAULT_MIRROR_HOST,
        );
        assert_eq!(out, "https://fxtwitter.com/a/status/9?s=20&t=abc#frag");
    }

    #[test]
    fn test_rewrite_case_insensitive_host() {
        let out = rewrite_links("HTTPS://X.COM/foo/status/1", DEFAULT_MIRROR_HOST);
        assert_eq!(out, "https://fxtwitter.com/foo/status/1");
    }

    #[test]
    fn test_rewrite_multiple_links_independently() {
        let out = rewrite_links(
            "a https://x.com/one b https://twitter.com/two c",
            DEFAULT_MIRROR_HOST,
        );
        assert_eq!(
            out,
            "a https://fxtwitter.com/one b https://fxtwitter.com/two c"
        );
    }

    #[test]
    fn test_rewrite_leaves_other_hosts_alone() {
        let text = "see https://example.com/x.com/trap and https://xx.com/foo";
        assert_eq!(rewrite_links(text, DEFAULT_MIRROR_HOST), text);
    }

    #[test]
    fn test_rewrite_no_links() {
        assert_eq!(rewrite_links("no links here", DEFAULT_MIRROR_HOST), "no links here");
        assert_eq!(rewrite_links("", DEFAULT_MIRROR_HOST), "");
    }

    #[test]
    fn test_rewrite_is_idempotent() {
        let once = rewrite_links(
            "check https://x.com/foo/status/1?s=20",
            DEFAULT_MIRROR_HOST,
        );
        let twice = rewrite_links(&once, DEFAULT_MIRROR_HOST);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rewrite_bare_host_requires_path() {
        // No path separator after the host, so not a link match.
        let text = "just https://x.com mentioned";
        assert_eq!(rewrite_links(text, DEFAULT_MIRROR_HOST), text);
    }

    #[test]
    fn test_rewrite_custom_mirror_host() {
        let out = rewrite_links("https://x.com/foo/status/1", "fixupx.com");
        assert_eq!(out, "https://fixupx.com/foo/status/1");
    }
}
