#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

mod equality;
mod prefix;
mod support;

pub use equality::{EqualityError, equality_errors, equality_errors_with};
pub use prefix::{PrefixError, PrefixErrorKind, prefix_errors, prefix_errors_with};
