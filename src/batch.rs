use crate::error::Result;
use crate::results::EeatReport;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default number of reports kept after ranking
pub const DEFAULT_RANK_LIMIT: usize = 5;

/// Result of scoring one URL in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    Scored(EeatReport),
    Failed { url: String, error: String },
}

impl Outcome {
    pub fn url(&self) -> &str {
        match self {
            Outcome::Scored(report) => &report.url,
            Outcome::Failed { url, .. } => url,
        }
    }

    fn from_result(url: String, result: Result<EeatReport>) -> Self {
        match result {
            Ok(report) => Outcome::Scored(report),
            Err(e) => {
                ::log::warn!("Scoring failed for {}: {}", url, e);
                Outcome::Failed {
                    url,
                    error: e.to_string(),
                }
            }
        }
    }
}

/// A report produced by an external service, such as the crawl delegation.
///
/// Only `url` and `totalScore` are relied on. Every other field is carried
/// through untouched, so loosely shaped reports (string suggestions, float
/// scores, no `scores` block) still rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReport {
    pub url: String,
    pub total_score: Number,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ExternalReport {
    /// Reads one entry of an external report list.
    ///
    /// Entries without a string `url` are dropped, and so are entries
    /// without a numeric `totalScore`, which cannot be ranked.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            ::log::debug!("Dropping report that is not an object");
            return None;
        };

        let Some(Value::String(url)) = fields.remove("url") else {
            ::log::debug!("Dropping report without a url");
            return None;
        };

        match fields.remove("totalScore") {
            Some(Value::Number(total_score)) => Some(Self {
                url,
                total_score,
                fields,
            }),
            _ => {
                let reason = fields
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("no totalScore");
                ::log::warn!("Report for {} left out of ranking: {}", url, reason);
                None
            }
        }
    }

    pub fn total(&self) -> f64 {
        self.total_score.as_f64().unwrap_or(0.0)
    }
}

/// Scores each URL in turn; a failure only affects its own entry
pub async fn evaluate_many<F, Fut>(urls: &[String], mut score: F) -> Vec<Outcome>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<EeatReport>>,
{
    let mut outcomes = Vec::with_capacity(urls.len());
    for url in urls {
        let result = score(url.clone()).await;
        outcomes.push(Outcome::from_result(url.clone(), result));
    }
    outcomes
}

/// Scores URLs with at most `max_concurrency` in flight.
///
/// Outcomes come back in input order, so ranking ties stay deterministic.
/// A task that panics is recorded as a failure for its URL.
pub async fn evaluate_many_concurrent<F, Fut>(
    urls: &[String],
    score: F,
    max_concurrency: usize,
) -> Vec<Outcome>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<EeatReport>> + Send + 'static,
{
    let score = Arc::new(score);
    let permits = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for (index, url) in urls.iter().cloned().enumerate() {
        let score = Arc::clone(&score);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let result = match permits.acquire_owned().await {
                Ok(_permit) => score(url.clone()).await,
                Err(e) => Err(crate::error::Error::fetch(&url, e)),
            };
            (index, Outcome::from_result(url, result))
        });
    }

    let mut slots: Vec<Option<Outcome>> = vec![None; urls.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => slots[index] = Some(outcome),
            Err(e) => ::log::error!("Scoring task aborted: {}", e),
        }
    }

    slots
        .into_iter()
        .zip(urls)
        .map(|(slot, url)| {
            slot.unwrap_or_else(|| Outcome::Failed {
                url: url.clone(),
                error: "scoring task aborted".to_string(),
            })
        })
        .collect()
}

/// Keeps scored reports, highest total first, at most `limit` of them.
///
/// Equal totals keep their input order.
pub fn rank(outcomes: Vec<Outcome>, limit: usize) -> Vec<EeatReport> {
    let mut reports = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            Outcome::Scored(report) => Some(report),
            Outcome::Failed { .. } => None,
        })
        .collect::<Vec<_>>();

    reports.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    reports.truncate(limit);
    reports
}

/// Ranks externally supplied reports the same way as `rank`.
///
/// Entries that cannot be ranked are dropped; see `ExternalReport::from_value`.
pub fn rank_values(values: Vec<Value>, limit: usize) -> Vec<ExternalReport> {
    let mut reports = values
        .into_iter()
        .filter_map(ExternalReport::from_value)
        .collect::<Vec<_>>();

    reports.sort_by(|a, b| b.total().total_cmp(&a.total()));
    reports.truncate(limit);
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::results::Scores;
    use serde_json::json;

    fn report(url: &str, total: u8) -> EeatReport {
        EeatReport {
            title: None,
            url: url.to_string(),
            scores: Scores::default(),
            total_score: total,
            suggestions: Vec::new(),
        }
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Scores `https://<n>.test/` as `n`, fails on anything called `bad`
    async fn score_by_host(url: String) -> Result<EeatReport> {
        let host = url
            .trim_start_matches("https://")
            .trim_end_matches(".test/")
            .to_string();
        match host.parse::<u8>() {
            Ok(total) => Ok(report(&url, total)),
            Err(_) => Err(Error::fetch(&url, "unreachable")),
        }
    }

    #[test]
    fn test_rank_orders_and_keeps_ties_stable() {
        let outcomes = vec![
            Outcome::Scored(report("a", 3)),
            Outcome::Scored(report("b", 9)),
            Outcome::Scored(report("c", 9)),
            Outcome::Scored(report("d", 1)),
        ];
        let ranked = rank(outcomes, DEFAULT_RANK_LIMIT);
        let order: Vec<&str> = ranked.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_rank_truncates_and_drops_failures() {
        let mut outcomes: Vec<Outcome> = (0..8)
            .map(|i| Outcome::Scored(report(&format!("u{i}"), i)))
            .collect();
        outcomes.insert(
            2,
            Outcome::Failed {
                url: "broken".to_string(),
                error: "boom".to_string(),
            },
        );

        let ranked = rank(outcomes, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].total_score, 7);
        assert_eq!(ranked[4].total_score, 3);
        assert!(ranked.iter().all(|r| r.url != "broken"));
    }

    #[test]
    fn test_external_report_from_value() {
        let own = serde_json::to_value(report("https://a.test/", 4)).unwrap();
        let parsed = ExternalReport::from_value(own).unwrap();
        assert_eq!(parsed.url, "https://a.test/");
        assert_eq!(parsed.total(), 4.0);
        assert!(parsed.fields.contains_key("scores"));

        // No url: dropped
        assert_eq!(ExternalReport::from_value(json!({"totalScore": 4})), None);
        assert_eq!(ExternalReport::from_value(json!({"url": 7, "totalScore": 4})), None);
        assert_eq!(ExternalReport::from_value(json!("just text")), None);

        // A url but no usable score: not rankable
        assert_eq!(
            ExternalReport::from_value(json!({"url": "https://b.test/", "error": "timeout"})),
            None
        );
        assert_eq!(
            ExternalReport::from_value(json!({"url": "https://b.test/", "totalScore": "9"})),
            None
        );
    }

    #[test]
    fn test_rank_values_accepts_loose_report_shapes() {
        let values = vec![
            json!({"url": "https://bare.test/", "totalScore": 9}),
            json!({
                "url": "https://strings.test/",
                "title": "Plain suggestions",
                "totalScore": 14,
                "suggestions": ["add author"]
            }),
            json!({
                "url": "https://float.test/",
                "totalScore": 12.0,
                "scores": {"experience": 3}
            }),
        ];
        let ranked = rank_values(values, DEFAULT_RANK_LIMIT);
        let order: Vec<&str> = ranked.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(
            order,
            vec!["https://strings.test/", "https://float.test/", "https://bare.test/"]
        );
        assert_eq!(ranked[0].fields["suggestions"], json!(["add author"]));

        // Extra fields survive a round through the output
        let out = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(out["totalScore"], json!(14));
        assert_eq!(out["title"], json!("Plain suggestions"));
    }

    #[test]
    fn test_rank_values_drops_malformed_entries() {
        let values = vec![
            serde_json::to_value(report("https://three.test/", 3)).unwrap(),
            json!({"title": "no url", "totalScore": 20}),
            serde_json::to_value(report("https://nine.test/", 9)).unwrap(),
            json!({"url": "https://failed.test/", "error": "analysis failed"}),
            serde_json::to_value(report("https://nine-too.test/", 9)).unwrap(),
            serde_json::to_value(report("https://one.test/", 1)).unwrap(),
        ];
        let ranked = rank_values(values, DEFAULT_RANK_LIMIT);
        let totals: Vec<f64> = ranked.iter().map(ExternalReport::total).collect();
        assert_eq!(totals, vec![9.0, 9.0, 3.0, 1.0]);
        assert_eq!(ranked[0].url, "https://nine.test/");
        assert_eq!(ranked[1].url, "https://nine-too.test/");
    }

    #[test]
    fn test_rank_values_truncates() {
        let values = (0..8)
            .map(|i| json!({"url": format!("https://{i}.test/"), "totalScore": i}))
            .collect();
        let ranked = rank_values(values, 3);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].url, "https://7.test/");
    }

    #[tokio::test]
    async fn test_evaluate_many_isolates_failures() {
        let input = urls(&["https://3.test/", "https://bad.test/", "https://9.test/"]);
        let outcomes = evaluate_many(&input, score_by_host).await;

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(&outcomes[0], Outcome::Scored(r) if r.total_score == 3));
        assert!(matches!(&outcomes[1], Outcome::Failed { url, .. } if url == "https://bad.test/"));
        assert!(matches!(&outcomes[2], Outcome::Scored(r) if r.total_score == 9));

        let ranked = rank(outcomes, DEFAULT_RANK_LIMIT);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].url, "https://9.test/");
    }

    #[tokio::test]
    async fn test_concurrent_keeps_input_order() {
        let input = urls(&[
            "https://9.test/",
            "https://bad.test/",
            "https://9.test/",
            "https://1.test/",
            "https://3.test/",
        ]);
        let outcomes = evaluate_many_concurrent(&input, score_by_host, 3).await;

        let seen: Vec<&str> = outcomes.iter().map(Outcome::url).collect();
        let expected: Vec<&str> = input.iter().map(String::as_str).collect();
        assert_eq!(seen, expected);
        assert!(matches!(outcomes[1], Outcome::Failed { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_panic_becomes_failure() {
        let input = urls(&["https://2.test/", "https://panic.test/"]);
        let outcomes = evaluate_many_concurrent(
            &input,
            |url: String| async move {
                if url.contains("panic") {
                    panic!("scorer blew up");
                }
                score_by_host(url).await
            },
            2,
        )
        .await;

        assert!(matches!(&outcomes[0], Outcome::Scored(r) if r.total_score == 2));
        assert!(matches!(&outcomes[1], Outcome::Failed { url, .. } if url == "https://panic.test/"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let outcomes = evaluate_many(&[], score_by_host).await;
        assert!(outcomes.is_empty());
        assert!(rank(outcomes, DEFAULT_RANK_LIMIT).is_empty());
    }
}
