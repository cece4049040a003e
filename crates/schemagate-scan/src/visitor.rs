//! # Scan Visitor
//!
//! One method per scan stage, each a no-op by default. A visitor opts in
//! to the fixture stages with [`ScanVisitor::wants_positive`] and
//! [`ScanVisitor::wants_negative`]; when it does not, the scanner never
//! even lists those folders.
//!
//! The owning schema record is passed into every fixture callback, so a
//! visitor never has to remember which schema is "current".

use schemagate_core::{FixtureRecord, GateError, SchemaRecord};

/// Callbacks invoked by the [`Scanner`](crate::Scanner).
#[allow(unused_variables)]
pub trait ScanVisitor {
    /// Schema stage: called once per qualifying schema file.
    fn schema(&mut self, record: &SchemaRecord) -> Result<(), GateError> {
        Ok(())
    }

    /// Called once after the schema stage.
    fn schema_done(&mut self) -> Result<(), GateError> {
        Ok(())
    }

    /// Whether the positive fixture stage runs for this visitor.
    fn wants_positive(&self) -> bool {
        false
    }

    /// Whether the negative fixture stage runs for this visitor.
    fn wants_negative(&self) -> bool {
        false
    }

    /// Called at the start of every fixture folder with the folder's
    /// schema, before any of its fixtures.
    fn folder_schema(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
        Ok(())
    }

    /// Called once per positive fixture.
    fn positive(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        Ok(())
    }

    /// Called after the last fixture of a positive folder.
    fn positive_done(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
        Ok(())
    }

    /// Called once per negative fixture.
    fn negative(&mut self, schema: &SchemaRecord, fixture: &FixtureRecord) -> Result<(), GateError> {
        Ok(())
    }

    /// Called after the last fixture of a negative folder.
    fn negative_done(&mut self, schema: &SchemaRecord) -> Result<(), GateError> {
        Ok(())
    }
}
