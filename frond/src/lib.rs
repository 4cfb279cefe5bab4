#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

pub use frond_core::*;
pub use frond_diff::*;
pub use frond_path::*;
