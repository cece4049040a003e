//! # Dialect Census
//!
//! Counts schemas per catalogue dialect. Documents that do not parse or
//! carry no recognisable `$schema` are counted as unknown, with one error
//! line each.

use std::collections::BTreeMap;

use schemagate_core::{Dialect, GateError, SchemaRecord};
use schemagate_scan::ScanVisitor;

/// Per-dialect schema counts.
#[derive(Debug, Clone, Default)]
pub struct DialectCensus {
    counts: BTreeMap<Dialect, usize>,
    unknown: usize,
}

impl DialectCensus {
    /// Create an empty census.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document.
    pub fn record(&mut self, record: &SchemaRecord) {
        let dialect = record.parse().ok().as_ref().and_then(Dialect::classify);
        match dialect {
            Some(dialect) => *self.counts.entry(dialect).or_default() += 1,
            None => {
                self.unknown += 1;
                tracing::error!("$schema is unknown in the file: {}", record.location);
            }
        }
    }

    /// Schemas counted for `dialect`.
    pub fn count(&self, dialect: Dialect) -> usize {
        self.counts.get(&dialect).copied().unwrap_or(0)
    }

    /// Schemas with no recognised dialect.
    pub fn unknown(&self) -> usize {
        self.unknown
    }

    /// All documents counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum::<usize>() + self.unknown
    }

    /// Log the totals, newest dialect first.
    pub fn log_totals(&self) {
        for dialect in Dialect::CATALOGUE {
            tracing::info!("Schemas using ({dialect}) Total files: {}", self.count(dialect));
        }
        tracing::info!("$schema unknown. Total files: {}", self.unknown);
    }
}

impl ScanVisitor for DialectCensus {
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        self.record(record);
        Ok(())
    }

    fn schema_done(&mut self) -> Result<(), GateError> {
        self.log_totals();
        Ok(())
    }
}
