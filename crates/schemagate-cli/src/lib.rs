//! # schemagate-cli
//!
//! The `schemagate` command-line interface for a JSON Schema store laid
//! out as `schemas/json/`, `test/`, `negative_test/` and
//! `api/json/catalog.json` under one root.
//!
//! ## Subcommands
//!
//! - `schemagate check` runs every local task in order, or one with `--only`.
//! - `schemagate downgrade` probes schemas for an older compatible dialect.
//! - `schemagate remote {census,bom,compile,links}` works on remotely
//!   hosted catalog entries.

pub mod check;
pub mod downgrade;
pub mod remote;
pub mod workspace;
