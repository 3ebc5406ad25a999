//! Test utilities for NodeLite integration tests
//!
//! TestFixture builds repositories through the public session API only.

#![allow(dead_code)]

pub mod test_fixture;
