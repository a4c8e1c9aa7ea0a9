pub mod html;
pub mod schema;

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use crate::results::{PageFacts, hostname_of};
use scraper::Html;
use url::Url;

/// Extracts the E-E-A-T signals of a page from its HTML.
///
/// Never fails on markup: broken or empty HTML yields facts with every
/// signal absent. The only error is a `url` that cannot be parsed, since
/// the hostname is needed for link and trust-domain checks.
pub fn extract(html: &str, url: &str) -> Result<PageFacts> {
    let hostname = hostname_of(url)?;
    let base = Url::parse(url).map_err(|e| Error::MalformedUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let doc = Html::parse_document(html);

    let title = html::meta_property(&doc, "og:title")
        .or_else(|| html::meta_name(&doc, "title"))
        .or_else(|| html::document_title(&doc));

    let publish_date = html::meta_name(&doc, "date")
        .or_else(|| html::meta_name(&doc, "article:published_time"))
        .or_else(|| html::meta_property(&doc, "article:published_time"));

    let blocks = schema::parse_blocks(&html::json_ld_blocks(&doc));
    let schema_types = blocks.iter().flat_map(|b| b.types()).collect::<Vec<_>>();

    let external_links_count = html::count_external_links(&doc, &base, &hostname);

    ::log::debug!(
        "Extracted {} schema types and {} external links from {}",
        schema_types.len(),
        external_links_count,
        url
    );

    Ok(PageFacts {
        url: url.to_string(),
        title,
        author: html::meta_name(&doc, "author"),
        publish_date,
        has_faq_schema: blocks.iter().any(|b| b.declares("FAQPage")),
        has_article_schema: blocks.iter().any(|b| b.declares("Article")),
        schema_types,
        external_links_count,
        has_user_reviews: html::has_user_reviews(&doc),
        has_author_page: html::has_author_page(&doc),
        hostname,
    })
}
