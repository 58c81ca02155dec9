//! Shared helpers for the CLI integration tests.
//!
//! The `assertions` module provides the [`CasinoAssertions`] trait and the
//! `asserter()` constructor so individual test files can validate CLI output
//! and JSONL round logs the same way.
//!
//! ```rust
//! use crate::helpers::asserter;
//! use crate::helpers::assertions::CasinoAssertions;
//!
//! let content = "{\"id\":\"000001\",\"game\":\"slots\",\"stake\":10,\"outcome\":\"lose\",\"payout\":0}";
//! asserter().assert_jsonl_format(content);
//! ```

pub mod assertions;

#[allow(unused_imports)]
pub use assertions::asserter;
