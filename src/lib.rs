//! Front-end for a small C-like language built on an LL(1) predictive parser.
//!
//! [`language`] defines the grammar, scanner and semantic profile of the language and
//! [`compile`] runs all phases over a source text.

pub use driver::{compile, Compilation};
pub use error::{Error, Result};

pub mod language;

mod driver;
mod error;
