//! # schemagate-schema
//!
//! Everything that needs a JSON Schema engine:
//!
//! - [`dispatch`]: dialect to engine-family mapping, strict and lenient
//!   compilation with per-schema quirks.
//! - [`vocabulary`]: keyword and format sets per family.
//! - [`probe`]: the downgrade prober.
//! - [`harness`] and [`legacy`]: conformance visitors for the strict and
//!   legacy partitions.
//! - [`census`]: per-dialect counts.
//!
//! Validation itself is delegated to the `jsonschema` crate.

pub mod census;
pub mod dispatch;
pub mod harness;
pub mod legacy;
pub mod probe;
pub mod vocabulary;

pub use census::DialectCensus;
pub use dispatch::{
    build_legacy_validator, build_validator, build_with, CompileError, CompiledValidator,
    EngineFamily, ExternalSchema, Outcome, Quirks, Strictness, Violation, Violations,
};
pub use harness::{compile_strict, ConformanceHarness, HarnessReport};
pub use legacy::LegacyHarness;
pub use probe::{retarget, CompileOracle, DispatchOracle, DowngradeScan, ProbeFinding, Prober};
pub use vocabulary::Vocabulary;
