// tests/normalize_url.rs
use linkpost_discover::normalize::{normalize_url, TrackingParams};

const SAMPLES: &[&str] = &[
    "https://example.com/article?utm_source=google&utm_medium=cpc&utm_campaign=test",
    "https://example.com/article?category=tech&utm_source=google",
    "https://example.com/a?x=1&fbclid=2&y=3#frag",
    "https://EXAMPLE.com/Path/?",
    "http://example.com",
    "https://example.com/p?q=rust%20lang&gclid=abc",
    "not-a-url",
    "",
    "   ",
    "mailto:someone@example.com?subject=hi&utm_source=mail",
];

#[test]
fn strips_tracking_only_query() {
    assert_eq!(
        normalize_url(
            "https://example.com/article?utm_source=google&utm_medium=cpc&utm_campaign=test"
        ),
        "https://example.com/article"
    );
}

#[test]
fn preserves_non_tracking_params() {
    assert_eq!(
        normalize_url("https://example.com/article?category=tech&utm_source=google"),
        "https://example.com/article?category=tech"
    );
}

#[test]
fn malformed_input_is_returned_unchanged() {
    assert_eq!(normalize_url("not-a-url"), "not-a-url");
    assert_eq!(normalize_url("   "), "   ");
}

#[test]
fn normalization_is_idempotent() {
    for u in SAMPLES {
        let once = normalize_url(u);
        assert_eq!(normalize_url(&once), once, "not idempotent for {u:?}");
    }
}

#[test]
fn never_leaves_dangling_question_mark() {
    for u in SAMPLES {
        assert!(!normalize_url(u).ends_with('?'), "dangling ? for {u:?}");
    }
}

#[test]
fn url_without_query_keeps_its_path_verbatim() {
    assert_eq!(normalize_url("https://example.com/a/b/"), "https://example.com/a/b/");
    // the parser itself adds the root path
    assert_eq!(normalize_url("http://example.com"), "http://example.com/");
}

#[test]
fn custom_denylist_injected() {
    let p = TrackingParams::new(["ref", "source"], Vec::<String>::new());
    assert_eq!(
        p.normalize_url("https://example.com/x?ref=nav&source=feed&utm_source=a"),
        "https://example.com/x?utm_source=a"
    );
}
