use crate::results::{EeatReport, IssueCode, PageFacts, Scores, Suggestion, SuggestionType};

/// Title keywords that hint at first-hand experience (matched case-insensitively)
pub const EXPERIENCE_KEYWORDS: &[&str] = &[
    "experience",
    "experiences",
    "benefit",
    "benefits",
    "review",
    "reviews",
    "tips",
    "guide",
    "實測",
    "心得",
    "使用方法",
];

/// Schema types that count as article markup for trustworthiness
pub const ARTICLE_TYPES: &[&str] = &["Article", "NewsArticle", "BlogPosting"];

/// Hostname substrings of government, health-authority and reference sites
pub const TRUSTED_DOMAINS: &[&str] = &[
    ".gov",
    "cdc.gov",
    "who.int",
    "health.gov",
    "fda.gov",
    "nih.gov",
    "wikipedia.org",
];

const MAX_SCORE: u8 = 5;

/// Scores a page's facts and lists what is missing.
///
/// Pure and total: every input, including facts with no signals at all,
/// produces a complete report.
pub fn evaluate(facts: &PageFacts) -> EeatReport {
    let scores = Scores {
        experience: experience(facts),
        expertise: expertise(facts),
        authoritativeness: authoritativeness(facts),
        trustworthiness: with_trusted_domain_bonus(&facts.hostname, trustworthiness(facts)),
    };

    EeatReport {
        title: facts.title.clone(),
        url: facts.url.clone(),
        total_score: scores.total(),
        scores,
        suggestions: suggestions(facts),
    }
}

fn experience(facts: &PageFacts) -> u8 {
    if facts.has_user_reviews {
        5
    } else if facts.title.as_deref().is_some_and(has_experience_keyword) {
        3
    } else {
        0
    }
}

fn has_experience_keyword(title: &str) -> bool {
    let title = title.to_lowercase();
    EXPERIENCE_KEYWORDS.iter().any(|k| title.contains(k))
}

fn expertise(facts: &PageFacts) -> u8 {
    match (facts.author.is_some(), facts.has_author_page) {
        (true, true) => 5,
        (true, false) | (false, true) => 3,
        (false, false) => 0,
    }
}

fn authoritativeness(facts: &PageFacts) -> u8 {
    match facts.external_links_count {
        n if n >= 5 => 5,
        0 => 0,
        _ => 3,
    }
}

fn trustworthiness(facts: &PageFacts) -> u8 {
    let has_article_type = facts
        .schema_types
        .iter()
        .any(|t| ARTICLE_TYPES.contains(&t.as_str()));

    let present = [
        facts.has_faq_schema,
        has_article_type,
        facts.publish_date.is_some(),
    ]
    .into_iter()
    .filter(|&signal| signal)
    .count();

    // Never zero: a page with none of the signals still gets 1
    match present {
        3 => 5,
        2 => 4,
        1 => 3,
        _ => 1,
    }
}

/// One-point bonus for trusted hostnames whose score is still below 4
fn with_trusted_domain_bonus(hostname: &str, score: u8) -> u8 {
    let hostname = hostname.to_lowercase();
    let trusted = TRUSTED_DOMAINS.iter().any(|d| hostname.contains(d));

    if trusted && score < 4 {
        (score + 1).min(MAX_SCORE)
    } else {
        score
    }
}

fn suggestions(facts: &PageFacts) -> Vec<Suggestion> {
    let mut out = Vec::new();

    if facts.author.is_none() {
        out.push(suggestion(
            SuggestionType::Structure,
            IssueCode::MissingAuthor,
            "建議補上作者資訊",
            r#"加入 <meta name="author"> 或作者段落"#,
        ));
    }

    if !facts.has_faq_schema {
        out.push(suggestion(
            SuggestionType::Schema,
            IssueCode::MissingFaqSchema,
            "可加入 FAQ 結構化資料以提升搜尋表現",
            "加入 @type: FAQPage 的 JSON-LD script",
        ));
    }

    // Only the literal `Article` type suppresses this one, unlike trustworthiness
    if !facts.has_article_schema && !facts.schema_types.iter().any(|t| t == "Article") {
        out.push(suggestion(
            SuggestionType::Schema,
            IssueCode::MissingArticleSchema,
            "可加入 Article Schema 強化內容標示",
            "加入 @type: Article 的 JSON-LD script",
        ));
    }

    if facts.publish_date.is_none() {
        out.push(suggestion(
            SuggestionType::Structure,
            IssueCode::MissingPublishDate,
            "建議補上文章發布時間",
            r#"加入 <meta name="date"> 或文章內文標註時間"#,
        ));
    }

    out
}

fn suggestion(kind: SuggestionType, issue: IssueCode, message: &str, action: &str) -> Suggestion {
    Suggestion {
        kind,
        issue,
        message: message.to_string(),
        action: action.to_string(),
    }
}
