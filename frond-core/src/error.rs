use core::fmt;

/// Errors raised by flattening, reconstruction, and structure matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A structural step was required of a type with no registered node
    /// handler.
    Unflattenable {
        /// Full name of the offending type.
        type_name: &'static str,
    },
    /// A reconstruction was handed the wrong number of leaves.
    LeafCount {
        /// Leaves the structure descriptor accounts for.
        expected: usize,
        /// Leaves actually supplied.
        got: usize,
    },
    /// A tree disagreed with the structure it was matched against.
    Mismatch {
        /// Description of the expected structure.
        expected: String,
        /// Description of what was found instead.
        got: String,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Unflattenable { type_name } => {
                write!(f, "can't flatten one level of {type_name}: no node handler is registered for it")
            }
            TreeError::LeafCount { expected, got } => {
                write!(f, "structure expects {expected} leaves, but {got} were supplied")
            }
            TreeError::Mismatch { expected, got } => {
                write!(f, "structure mismatch: expected {expected}, got {got}")
            }
        }
    }
}

impl core::error::Error for TreeError {}
