//! Utility helpers for SQLite storage operations.

/// Chunk size for SQLite statements with many bind parameters.
///
/// SQLite limits the number of parameters per statement
/// (SQLITE_MAX_VARIABLE_NUMBER). 500 stays safely below the conservative
/// default and leaves room for the query's other parameters.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Split a slice for batched `IN (...)` queries and multi-row inserts.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}
