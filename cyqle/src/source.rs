//! Data-source boundary.
//!
//! The core only ever needs three operations from a database client:
//! execute a query with bind parameters, fetch the resulting rows, and
//! close. Connection setup, credentials and driver selection live entirely
//! behind this trait.

use crate::error::Result;
use crate::value::Row;
use crate::Value;

/// Ordered named bind parameters: `("id0", v0)`, `("id1", v1)`, ...
///
/// The mapping is computed once from the root identifiers and threaded
/// unchanged through every nesting level of a build.
pub type Binds = Vec<(String, Value)>;

/// Minimal contract a database client must satisfy.
///
/// Implementations wrap their driver errors with [`crate::Error::execution`];
/// a failed call aborts the whole build.
pub trait DataSource {
    /// Execute a query with the given bind parameters.
    fn execute(&mut self, query: &str, binds: &Binds) -> Result<()>;

    /// Fetch all rows produced by the last executed query.
    fn fetch_rows(&mut self) -> Result<Vec<Row>>;

    /// Release the underlying connection.
    fn close(&mut self) -> Result<()>;
}
