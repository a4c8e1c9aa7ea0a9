use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector should be valid")
}

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static REVIEWS: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"[class*="review"], [class*="comment"]"#));
static AUTHOR_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="author"], a[href*="about"]"#));
static META: LazyLock<Selector> = LazyLock::new(|| selector("meta"));

/// Content of the first `<meta name=...>` with a non-empty value
pub fn meta_name(doc: &Html, name: &str) -> Option<String> {
    meta_content(doc, "name", name)
}

/// Content of the first `<meta property=...>` with a non-empty value
pub fn meta_property(doc: &Html, property: &str) -> Option<String> {
    meta_content(doc, "property", property)
}

fn meta_content(doc: &Html, attr: &str, key: &str) -> Option<String> {
    doc.select(&META)
        .filter(|e| e.value().attr(attr) == Some(key))
        .filter_map(|e| e.value().attr("content"))
        .find(|content| !content.is_empty())
        .map(str::to_string)
}

/// Text of the first `<title>` element, if non-empty
pub fn document_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE)
        .next()
        .map(|e| e.text().collect::<String>())
        .filter(|title| !title.is_empty())
}

/// Counts links whose resolved host differs from `hostname`.
///
/// Empty targets, targets that fail to resolve against `base` and
/// host-less targets such as `mailto:` are not counted.
pub fn count_external_links(doc: &Html, base: &Url, hostname: &str) -> usize {
    doc.select(&LINKS)
        .filter_map(|e| e.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .filter(|target| match target.host_str() {
            Some(host) => !host.eq_ignore_ascii_case(hostname),
            None => false,
        })
        .count()
}

/// Any element whose class attribute contains `review` or `comment`
pub fn has_user_reviews(doc: &Html) -> bool {
    doc.select(&REVIEWS).next().is_some()
}

/// Any link whose target contains `author` or `about`
pub fn has_author_page(doc: &Html) -> bool {
    doc.select(&AUTHOR_LINKS).next().is_some()
}

/// Raw text of every `<script type="application/ld+json">` block, in document order
pub fn json_ld_blocks(doc: &Html) -> Vec<String> {
    static SCRIPTS: LazyLock<Selector> = LazyLock::new(|| selector("script[type]"));

    doc.select(&SCRIPTS)
        .filter(|e| {
            e.value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case("application/ld+json"))
        })
        .map(|e| e.text().collect::<String>())
        .collect()
}
