//! # Link Check
//!
//! Every remote catalog URL must answer `200 OK` with a body that has no
//! UTF-8 byte-order mark and parses as JSON. Problems are collected and
//! logged; the check itself never fails.

use std::fmt;

use crate::fetch::RemoteFetcher;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// What was wrong with one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkProblem {
    /// The fetch failed or the status was not `200`.
    Unreachable(String),
    /// The body starts with a UTF-8 BOM.
    ByteOrderMark,
    /// The body is not JSON.
    InvalidJson(String),
}

impl fmt::Display for LinkProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable(reason) => write!(f, "unreachable: {reason}"),
            Self::ByteOrderMark => f.write_str("has a UTF-8 BOM"),
            Self::InvalidJson(reason) => write!(f, "invalid JSON: {reason}"),
        }
    }
}

/// Result of a link check pass.
#[derive(Debug, Clone, Default)]
pub struct LinkReport {
    /// URLs checked.
    pub checked: usize,
    /// Problems in URL order.
    pub problems: Vec<(String, LinkProblem)>,
}

impl LinkReport {
    /// Whether every URL was fine.
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Check each URL in order.
pub async fn check_links(fetcher: &RemoteFetcher, urls: &[&str]) -> LinkReport {
    let mut report = LinkReport::default();
    for url in urls {
        report.checked += 1;
        let problem = match fetcher.fetch(url).await {
            Err(e) => Some(LinkProblem::Unreachable(e.to_string())),
            Ok(record) if record.raw.starts_with(UTF8_BOM) => Some(LinkProblem::ByteOrderMark),
            Ok(record) => serde_json::from_slice::<serde_json::Value>(&record.raw)
                .err()
                .map(|e| LinkProblem::InvalidJson(e.to_string())),
        };
        match problem {
            Some(problem) => {
                tracing::error!("{url} {problem}");
                report.problems.push((url.to_string(), problem));
            }
            None => tracing::info!("link ok | {url}"),
        }
    }
    tracing::info!(
        "Links checked: {} ({} with problems)",
        report.checked,
        report.problems.len()
    );
    report
}
