//! The Failure and Result types of this library.
//!
//! Allocation can fail. The raw `unsafe` operations surface a mechanism's
//! failure signal as-is, a null pointer or an unwinding panic, while the
//! checked `try_xxx` companions report the cause as a `Failure`.

use super::root::{error, fmt, result};

/// Universal Failure type of this library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Failure {
    /// The process-wide default mechanism was already established.
    DefaultLocked,
    /// The number of bytes to allocate cannot be represented by a mechanism
    /// byte count.
    ElementsOverflow,
    /// The mechanism could not allocate memory.
    OutOfMemory,
    /// The element type requires stricter alignment than mechanisms
    /// guarantee.
    UnsupportedAlignment,
}

impl error::Error for Failure {}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Universal Result type of this library.
pub type Result<T> = result::Result<T, Failure>;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn failure_display() {
        assert_eq!("OutOfMemory", format!("{}", Failure::OutOfMemory));
    }
}
