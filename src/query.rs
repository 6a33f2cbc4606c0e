//! Query files: batches of location pairs to intersect.
//!
//! A query file is JSON:
//!
//! ```json
//! {
//!   "config": { "threshold": 4 },
//!   "queries": [
//!     {
//!       "name": "even",
//!       "lhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
//!                "dims": [{ "start": 0, "step": 1, "trip_count": 100, "dim_size": 100 }] },
//!       "rhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
//!                "dims": [{ "start": 0, "step": 2, "trip_count": 50, "dim_size": 100 }] }
//!     }
//!   ]
//! }
//! ```
//!
//! `config` is optional, and each query may override `threshold` and
//! `complements`.

use crate::analysis::intersect::{Complements, Intersection, RangeEngine};
use crate::analysis::verify::{check, VerifyReport};
use crate::location::{Dimension, MemoryLocationRange};
use crate::utils::errors::{MemLocResult, QueryError, QueryErrorKind};
use crate::utils::solution_print::{visualize_1d, SolutionPrinter};
use crate::EngineConfig;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Widest dimension drawn in text reports.
const MAX_DRAWN_EXTENT: u64 = 80;

/// One pair of locations to intersect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    /// Label used in reports
    #[serde(default)]
    pub name: Option<String>,
    /// Left-hand side
    pub lhs: MemoryLocationRange,
    /// Right-hand side
    pub rhs: MemoryLocationRange,
    /// Per-query threshold override
    #[serde(default)]
    pub threshold: Option<usize>,
    /// Per-query complement override
    #[serde(default)]
    pub complements: Option<bool>,
}

impl Query {
    /// Create a query without overrides.
    pub fn new(lhs: MemoryLocationRange, rhs: MemoryLocationRange) -> Self {
        Self {
            name: None,
            lhs,
            rhs,
            threshold: None,
            complements: None,
        }
    }

    /// Engine settings for this query on top of `base`.
    pub fn config(&self, base: &EngineConfig) -> EngineConfig {
        let mut config = base.clone();
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(complements) = self.complements {
            config.compute_complements = complements;
        }
        config
    }
}

/// Contents of a query file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFile {
    /// Engine settings shared by all queries
    #[serde(default)]
    pub config: Option<EngineConfig>,
    /// The queries
    pub queries: Vec<Query>,
}

impl QueryFile {
    /// Engine settings from the file, or the defaults.
    pub fn engine_config(&self) -> EngineConfig {
        self.config.clone().unwrap_or_default()
    }
}

/// Parse and validate a query file.
pub fn parse_queries(text: &str) -> MemLocResult<QueryFile> {
    let file: QueryFile = serde_json::from_str(text)?;
    if file.queries.is_empty() {
        return Err(QueryError::new("no queries", QueryErrorKind::Empty).into());
    }
    for (index, query) in file.queries.iter().enumerate() {
        for (side, loc) in [("lhs", &query.lhs), ("rhs", &query.rhs)] {
            loc.validate().map_err(|err| {
                QueryError::new(format!("{}: {}", side, err), QueryErrorKind::InvalidLocation).at(index)
            })?;
        }
    }
    debug!("parsed {} queries", file.queries.len());
    Ok(file)
}

/// Read, parse and validate a query file.
pub fn load_queries(path: &Path) -> MemLocResult<QueryFile> {
    let text = fs::read_to_string(path)?;
    parse_queries(&text)
}

/// Result of running one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryReport {
    /// Query label
    pub name: String,
    /// Short name of the outcome
    pub verdict: String,
    /// Exact intersection, if computed
    pub intersection: Option<MemoryLocationRange>,
    /// Leftovers of the left-hand side
    pub left: Vec<MemoryLocationRange>,
    /// Leftovers of the right-hand side
    pub right: Vec<MemoryLocationRange>,
    /// Outcome of the brute-force check, if requested
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_report")]
    pub verification: Option<VerifyReport>,
}

impl QueryReport {
    /// Check if the brute-force check found a violation.
    pub fn failed_verification(&self) -> bool {
        self.verification.as_ref().is_some_and(|v| !v.is_ok())
    }
}

fn serialize_report<S: serde::Serializer>(report: &Option<VerifyReport>, serializer: S) -> Result<S::Ok, S::Error> {
    match report {
        Some(report) => serializer.collect_str(report),
        None => serializer.serialize_none(),
    }
}

/// Run one query.
///
/// With `verify_limit` set, the result is checked by enumerating up to that
/// many bytes per location.
pub fn run_query(
    query: &Query,
    index: usize,
    base: &EngineConfig,
    verify_limit: Option<u64>,
) -> QueryReport {
    let name = query.name.clone().unwrap_or_else(|| format!("query{}", index));
    let config = query.config(base);
    let complements_requested = config.compute_complements;
    let engine = RangeEngine::with_config(config);

    let (result, complements) = engine.intersect_with_complements(&query.lhs, &query.rhs);
    info!("{}: {}", name, result);

    let verification = verify_limit.map(|limit| {
        let requested = complements_requested.then_some(&complements);
        check(&query.lhs, &query.rhs, &result, requested, limit)
    });

    let Complements { left, right } = complements;
    QueryReport {
        name,
        verdict: result.short_name().to_string(),
        intersection: match result {
            Intersection::Exact(loc) => Some(loc),
            _ => None,
        },
        left,
        right,
        verification,
    }
}

/// Run every query of a file with `base` as the shared engine settings.
pub fn run_all(file: &QueryFile, base: &EngineConfig, verify_limit: Option<u64>) -> Vec<QueryReport> {
    file.queries
        .iter()
        .enumerate()
        .map(|(index, query)| run_query(query, index, base, verify_limit))
        .collect()
}

/// Render reports as human-readable text.
pub fn render_text(reports: &[QueryReport]) -> String {
    let mut out = String::new();
    for report in reports {
        out.push_str(&format!("== {}: {}\n", report.name, report.verdict));
        if let Some(int) = &report.intersection {
            let mut printer = SolutionPrinter::new();
            printer.print_solution(int, Some(report.left.as_slice()), Some(report.right.as_slice()));
            out.push_str(printer.output());
            if let [dim] = int.dims.as_slice() {
                out.push_str(&draw(dim));
            }
        }
        if let Some(verification) = &report.verification {
            out.push_str(&format!("verify: {}\n", verification));
        }
    }
    out
}

fn draw(dim: &Dimension) -> String {
    if dim.dim_size == 0 || dim.dim_size > MAX_DRAWN_EXTENT {
        return String::new();
    }
    format!("{}\n", visualize_1d(dim, dim.dim_size))
}

/// Render reports as pretty-printed JSON.
pub fn render_json(reports: &[QueryReport]) -> MemLocResult<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::MemLocError;

    const EVEN: &str = r#"{
        "queries": [{
            "name": "even",
            "lhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
                     "dims": [{ "start": 0, "step": 1, "trip_count": 100, "dim_size": 100 }] },
            "rhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
                     "dims": [{ "start": 0, "step": 2, "trip_count": 50, "dim_size": 100 }] }
        }]
    }"#;

    #[test]
    fn test_parse_and_run() {
        let file = parse_queries(EVEN).unwrap();
        assert_eq!(file.queries.len(), 1);
        let reports = run_all(&file, &EngineConfig::default(), Some(10_000));
        let report = &reports[0];
        assert_eq!(report.name, "even");
        assert_eq!(report.verdict, "exact");
        assert_eq!(report.left.len(), 1);
        assert_eq!(report.left[0].dims, vec![Dimension::new(1, 2, 50, 100)]);
        assert!(report.right.is_empty());
        assert_eq!(report.verification, Some(VerifyReport::Passed));
        assert!(!report.failed_verification());
    }

    #[test]
    fn test_flat_query_defaults() {
        let text = r#"{ "queries": [ {
            "lhs": { "ptr": 3, "kind": "default", "lower_bound": 0 },
            "rhs": { "ptr": 3, "kind": "default", "lower_bound": 8, "upper_bound": 16 }
        } ] }"#;
        let file = parse_queries(text).unwrap();
        assert_eq!(file.queries[0].lhs.upper_bound, None);
        let report = run_query(&file.queries[0], 0, &EngineConfig::default(), None);
        assert_eq!(report.name, "query0");
        assert_eq!(report.verdict, "may-overlap");
        assert!(report.intersection.is_none());
    }

    #[test]
    fn test_invalid_location_is_reported() {
        let text = r#"{ "queries": [ {
            "lhs": { "ptr": 0, "kind": "collapsed", "upper_bound": 4,
                     "dims": [{ "start": 0, "step": 0, "trip_count": 1, "dim_size": 1 }] },
            "rhs": { "ptr": 0, "kind": "default", "lower_bound": 0, "upper_bound": 4 }
        } ] }"#;
        match parse_queries(text) {
            Err(MemLocError::Query(err)) => {
                assert_eq!(err.kind, QueryErrorKind::InvalidLocation);
                assert_eq!(err.index, Some(0));
                assert!(err.message.starts_with("lhs:"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_dimension_is_rejected() {
        let text = r#"{ "queries": [ {
            "lhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
                     "dims": [{ "start": 0, "step": 1, "trip_count": 4, "dim_size": 4 }] },
            "rhs": { "ptr": 0, "kind": "collapsed", "lower_bound": 0, "upper_bound": 4,
                     "dims": [{ "start": 18446744073709551000, "step": 1000, "trip_count": 2, "dim_size": 4 }] }
        } ] }"#;
        match parse_queries(text) {
            Err(MemLocError::Query(err)) => {
                assert_eq!(err.kind, QueryErrorKind::InvalidLocation);
                assert!(err.message.starts_with("rhs:"));
                assert!(err.message.contains("u64::MAX"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(matches!(
            parse_queries(r#"{ "queries": [] }"#),
            Err(MemLocError::Query(QueryError { kind: QueryErrorKind::Empty, .. }))
        ));
        assert!(matches!(parse_queries("not json"), Err(MemLocError::Json(_))));
    }

    #[test]
    fn test_query_overrides() {
        let mut file = parse_queries(EVEN).unwrap();
        file.queries[0].complements = Some(false);
        let reports = run_all(&file, &EngineConfig::default(), None);
        assert!(reports[0].left.is_empty());

        let query = Query { threshold: Some(0), ..file.queries[0].clone() };
        assert_eq!(query.config(&EngineConfig::default()).threshold, 0);
    }

    #[test]
    fn test_file_config() {
        let text = r#"{ "config": { "threshold": 2 }, "queries": [ {
            "lhs": { "ptr": 0, "kind": "default", "lower_bound": 0, "upper_bound": 4 },
            "rhs": { "ptr": 0, "kind": "default", "lower_bound": 0, "upper_bound": 4 }
        } ] }"#;
        let file = parse_queries(text).unwrap();
        let config = file.engine_config();
        assert_eq!(config.threshold, 2);
        assert!(config.compute_complements);
        assert_eq!(parse_queries(EVEN).unwrap().engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_failed_verification_is_reported() {
        let file = parse_queries(EVEN).unwrap();
        let mut report = run_query(&file.queries[0], 0, &EngineConfig::default(), None);
        assert!(!report.failed_verification());

        let lhs = &file.queries[0].lhs;
        report.verification = Some(check(lhs, lhs, &Intersection::Disjoint, None, 10_000));
        assert!(report.failed_verification());
        let json = render_json(std::slice::from_ref(&report)).unwrap();
        assert!(json.contains("\"verification\": \"FAILED"));
        assert!(render_text(&[report]).contains("verify: FAILED"));
    }

    #[test]
    fn test_render() {
        let file = parse_queries(EVEN).unwrap();
        let reports = run_all(&file, &EngineConfig::default(), None);
        let text = render_text(&reports);
        assert!(text.starts_with("== even: exact\n"));
        assert!(text.contains("[EQUATION] Solution:"));
        let json = render_json(&reports).unwrap();
        assert!(json.contains("\"verdict\": \"exact\""));
        assert!(!json.contains("verification"));
    }
}
