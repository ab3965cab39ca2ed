//! Builder-internal tests.
//!
//! Tests for the type translator and the instantiation machinery that need
//! access to session internals. End-to-end coverage lives in the top-level
//! `tests/` suites.

mod tests_instantiate;
