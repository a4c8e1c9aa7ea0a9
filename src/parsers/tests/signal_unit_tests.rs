use crate::parsers::html;
use scraper::Html;
use url::Url;

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_user_reviews_class_match() {
        let doc = Html::parse_document(r#"<div class="product-reviews">...</div>"#);
        assert!(html::has_user_reviews(&doc));

        let doc = Html::parse_document(r#"<section class="wrap commentList"></section>"#);
        assert!(html::has_user_reviews(&doc));

        // Substring match is case-sensitive
        let doc = html_doc(r#"<div class="Reviews"></div>"#);
        assert!(!html::has_user_reviews(&doc));

        let doc = html_doc(r#"<div id="review"></div>"#);
        assert!(!html::has_user_reviews(&doc));
    }

    #[test]
    fn test_author_page_link() {
        let doc = html_doc(r#"<a href="/author/jane">Jane</a>"#);
        assert!(html::has_author_page(&doc));

        let doc = html_doc(r#"<a href="https://example.com/about-us">About</a>"#);
        assert!(html::has_author_page(&doc));

        // Text is irrelevant, only the target counts
        let doc = html_doc(r#"<a href="/team">About the author</a>"#);
        assert!(!html::has_author_page(&doc));
    }

    #[test]
    fn test_meta_lookup() {
        let doc = html_doc(
            r#"<meta name="author" content="">
               <meta name="author" content="Second">
               <meta property="og:title" content="Share">"#,
        );
        // The first tag with a value wins
        assert_eq!(html::meta_name(&doc, "author").as_deref(), Some("Second"));
        assert_eq!(html::meta_property(&doc, "og:title").as_deref(), Some("Share"));
        assert_eq!(html::meta_name(&doc, "og:title"), None);
    }

    #[test]
    fn test_json_ld_blocks_type_is_case_insensitive() {
        let doc = html_doc(
            r#"<script type="Application/LD+JSON">{"@type":"Article"}</script>
               <script>{"@type":"Ignored"}</script>"#,
        );
        let blocks = html::json_ld_blocks(&doc);
        assert_eq!(blocks, vec![r#"{"@type":"Article"}"#.to_string()]);
    }

    #[test]
    fn test_count_external_links_compares_hosts_only() {
        let base = Url::parse("https://example.com/page").unwrap();
        let doc = html_doc(
            r#"<a href="http://example.com/other">http self</a>
               <a href="https://example.com:8443/x">port self</a>
               <a href="https://EXAMPLE.com/upper">upper self</a>
               <a href="https://elsewhere.com/">away</a>"#,
        );
        assert_eq!(html::count_external_links(&doc, &base, "example.com"), 1);
    }

    fn html_doc(fragment: &str) -> Html {
        Html::parse_document(fragment)
    }
}
