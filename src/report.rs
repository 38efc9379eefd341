//! Search analytics reporting helpers
//!
//! Request/response shapes for `searchAnalytics/query` plus the small
//! transformations used to chart the results.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GscError, Result};

// ============================================================================
// SEARCH ANALYTICS TYPES
// ============================================================================

/// Body of a `searchAnalytics/query` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsQuery {
    /// `YYYY-MM-DD`, inclusive
    pub start_date: String,
    /// `YYYY-MM-DD`, inclusive
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_row: Option<u32>,
}

impl SearchAnalyticsQuery {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            dimensions: vec![],
            row_limit: None,
            start_row: None,
        }
    }

    /// Query covering the `days` days ending on `today` (inclusive)
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        let range = date_range(days, today);
        // date_range always yields at least `today`
        let end = range.first().cloned().unwrap_or_default();
        let start = range.last().cloned().unwrap_or_default();
        Self::new(start, end)
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }

    pub fn with_row_limit(mut self, limit: u32) -> Self {
        self.row_limit = Some(limit);
        self
    }
}

/// Response of a `searchAnalytics/query` request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAnalyticsResponse {
    #[serde(default)]
    pub rows: Option<Vec<SearchAnalyticsRow>>,
    #[serde(default)]
    pub response_aggregation_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchAnalyticsRow {
    /// Dimension values, in the order the query listed them
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
    #[serde(default)]
    pub ctr: f64,
    #[serde(default)]
    pub position: f64,
}

/// One bar of a clicks chart: the row key, its clicks, and its share of the maximum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryShare {
    pub key: String,
    pub val: f64,
    /// `val / max(val)`, or 0 when that ratio is undefined
    pub percent: f64,
}

// ============================================================================
// TRANSFORMATIONS
// ============================================================================

/// `range` ISO dates, newest first, starting at `today`.
///
/// `today` is always included, so `range` 0 and 1 both yield one date.
pub fn date_range(range: u32, today: NaiveDate) -> Vec<String> {
    let mut dates = vec![today];

    for offset in 1..range {
        if let Some(date) = today.checked_sub_days(Days::new(u64::from(offset))) {
            dates.push(date);
        }
    }

    dates
        .into_iter()
        .map(|date| date.format("%Y-%m-%d").to_string())
        .collect()
}

/// [`date_range`] from the current UTC date
pub fn date_range_from_today(range: u32) -> Vec<String> {
    date_range(range, Utc::now().date_naive())
}

/// Map rows to their first key, clicks, and clicks relative to the busiest row
pub fn map_queries(queries: &SearchAnalyticsResponse) -> Vec<QueryShare> {
    let Some(rows) = &queries.rows else {
        return vec![];
    };

    let max_val = rows
        .iter()
        .map(|row| row.clicks)
        .fold(f64::NEG_INFINITY, f64::max);

    rows.iter()
        .map(|row| {
            let percent = row.clicks / max_val;
            QueryShare {
                key: row.keys.first().cloned().unwrap_or_default(),
                val: row.clicks,
                percent: if percent.is_finite() { percent } else { 0.0 },
            }
        })
        .collect()
}

/// The site's `/sitemap.xml` URL (path replaced, query kept)
pub fn sitemap_url(site_url: &str) -> Result<String> {
    let mut url = Url::parse(site_url).map_err(|e| GscError::InvalidUrl {
        url: site_url.to_string(),
        reason: e.to_string(),
    })?;
    url.set_path("/sitemap.xml");
    Ok(url.to_string())
}

/// Remove a single trailing `/`
pub fn strip_trailing_slash(s: &str) -> &str {
    s.strip_suffix('/').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn response(clicks: &[f64]) -> SearchAnalyticsResponse {
        SearchAnalyticsResponse {
            rows: Some(
                clicks
                    .iter()
                    .enumerate()
                    .map(|(i, c)| SearchAnalyticsRow {
                        keys: vec![format!("query {}", i)],
                        clicks: *c,
                        ..Default::default()
                    })
                    .collect(),
            ),
            response_aggregation_type: None,
        }
    }

    #[test]
    fn test_date_range_descending_from_today() {
        assert_eq!(
            date_range(3, day(2024, 3, 1)),
            vec!["2024-03-01", "2024-02-29", "2024-02-28"]
        );
    }

    #[test]
    fn test_date_range_always_includes_today() {
        assert_eq!(date_range(0, day(2024, 1, 1)), vec!["2024-01-01"]);
        assert_eq!(date_range(1, day(2024, 1, 1)), vec!["2024-01-01"]);
    }

    #[test]
    fn test_date_range_crosses_year() {
        let dates = date_range(2, day(2024, 1, 1));
        assert_eq!(dates, vec!["2024-01-01", "2023-12-31"]);
    }

    #[test]
    fn test_date_range_from_today_len() {
        assert_eq!(date_range_from_today(28).len(), 28);
    }

    #[test]
    fn test_map_queries_percent_of_max() {
        let mapped = map_queries(&response(&[10.0, 5.0, 20.0, 0.0]));

        let percents: Vec<f64> = mapped.iter().map(|m| m.percent).collect();
        assert_eq!(percents, vec![0.5, 0.25, 1.0, 0.0]);
        assert_eq!(mapped[2].key, "query 2");
        assert_eq!(mapped[2].val, 20.0);
    }

    #[test]
    fn test_map_queries_all_zero_is_zero_percent() {
        let mapped = map_queries(&response(&[0.0, 0.0, 0.0]));
        assert!(mapped.iter().all(|m| m.percent == 0.0));
        assert_eq!(mapped.len(), 3);
    }

    #[test]
    fn test_map_queries_without_rows() {
        assert!(map_queries(&SearchAnalyticsResponse::default()).is_empty());
        assert!(map_queries(&response(&[])).is_empty());
    }

    #[test]
    fn test_map_queries_row_without_keys() {
        let mut data = response(&[3.0]);
        data.rows.as_mut().unwrap()[0].keys.clear();
        assert_eq!(map_queries(&data)[0].key, "");
    }

    #[test]
    fn test_response_deserializes_api_shape() {
        let json = r#"{
            "rows": [{"keys": ["rust"], "clicks": 7, "impressions": 100, "ctr": 0.07, "position": 3.2}],
            "responseAggregationType": "byProperty"
        }"#;
        let parsed: SearchAnalyticsResponse = serde_json::from_str(json).unwrap();
        let rows = parsed.rows.unwrap();
        assert_eq!(rows[0].keys, vec!["rust"]);
        assert_eq!(rows[0].clicks, 7.0);
        assert_eq!(parsed.response_aggregation_type.as_deref(), Some("byProperty"));
    }

    #[test]
    fn test_query_serializes_camel_case() {
        let query = SearchAnalyticsQuery::last_days(7, day(2024, 5, 10))
            .with_dimension("query")
            .with_row_limit(25);

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "startDate": "2024-05-04",
                "endDate": "2024-05-10",
                "dimensions": ["query"],
                "rowLimit": 25
            })
        );
    }

    #[test]
    fn test_sitemap_url_replaces_path() {
        assert_eq!(
            sitemap_url("https://example.com/blog/post").unwrap(),
            "https://example.com/sitemap.xml"
        );
    }

    #[test]
    fn test_sitemap_url_rejects_invalid() {
        let err = sitemap_url("sc-domain example").unwrap_err();
        assert_eq!(err.code(), "GSC-040");
    }

    #[test]
    fn test_strip_trailing_slash() {
        assert_eq!(strip_trailing_slash("https://a.test/"), "https://a.test");
        assert_eq!(strip_trailing_slash("https://a.test"), "https://a.test");
        assert_eq!(strip_trailing_slash("a//"), "a/");
    }
}
