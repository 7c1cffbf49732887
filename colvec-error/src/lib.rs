#![deny(missing_docs)]
#![feature(error_generic_member_access)]

//! Error handling for the colvec workspace.
//!
//! Every fallible operation returns a [`ColvecResult`]. Errors are synchronous and local: the
//! vectors, writers and readers never retry, and an error leaves the offending call without
//! effect on the underlying buffers.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

/// A string that can be either owned or borrowed from a static.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for colvec.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum ColvecError {
    /// A write targeted a child slot outside the current fixed-size row.
    #[error(
        "values at index {slot} overflow row {row} of a fixed-size list with list size \
         {list_size}\nBacktrace:\n{backtrace}"
    )]
    RowOverflow {
        /// The outer row being written.
        row: usize,
        /// The fixed stride of the list.
        list_size: usize,
        /// The child slot the write would have targeted.
        slot: usize,
        /// Where the overflow was detected.
        backtrace: Backtrace,
    },
    /// A capability was invoked on a vector, writer or reader that cannot support it.
    #[error("unsupported operation: {0}\nBacktrace:\n{1}")]
    UnsupportedOperation(ErrString, Backtrace),
    /// The contents of a buffer do not describe a valid encoding.
    #[error("corrupt encoding: {0}\nBacktrace:\n{1}")]
    CorruptEncoding(ErrString, Backtrace),
    /// The buffer allocator refused to hand out more memory.
    #[error(
        "failed to allocate {requested} bytes ({allocated} of {limit} bytes already \
         allocated)\nBacktrace:\n{backtrace}"
    )]
    AllocationFailure {
        /// The number of bytes requested.
        requested: usize,
        /// The number of bytes held by the allocator at the time of the request.
        allocated: usize,
        /// The allocator limit.
        limit: usize,
        /// Where the failure was raised.
        backtrace: Backtrace,
    },
    /// An index is out of bounds.
    #[error("index {0} out of bounds from {1} to {2}\nBacktrace:\n{3}")]
    OutOfBounds(usize, usize, usize, Backtrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// Two types were expected to match but did not.
    #[error("expected type {0} but found type {1}\nBacktrace:\n{2}")]
    MismatchedTypes(ErrString, ErrString, Backtrace),
    /// An internal assertion failed.
    #[error("{0}\nBacktrace:\n{1}")]
    AssertionFailed(ErrString, Backtrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<ColvecError>),
}

impl ColvecError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        ColvecError::Context(msg.into(), Box::new(self))
    }

    /// Returns the innermost error, skipping any layers of context.
    pub fn root(&self) -> &ColvecError {
        match self {
            ColvecError::Context(_, inner) => inner.root(),
            other => other,
        }
    }
}

impl Debug for ColvecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// A type alias for Results that return [`ColvecError`]s as their error type.
pub type ColvecResult<T> = Result<T, ColvecError>;

/// A convenient macro for creating a [`ColvecError`].
#[macro_export]
macro_rules! colvec_err {
    (RowOverflow: $row:expr, $list_size:expr, $slot:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::ColvecError::RowOverflow {
            row: $row,
            list_size: $list_size,
            slot: $slot,
            backtrace: Backtrace::capture(),
        })
    }};
    (AllocationFailure: $requested:expr, $allocated:expr, $limit:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::ColvecError::AllocationFailure {
            requested: $requested,
            allocated: $allocated,
            limit: $limit,
            backtrace: Backtrace::capture(),
        })
    }};
    (OutOfBounds: $idx:expr, $start:expr, $stop:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::ColvecError::OutOfBounds(
            $idx,
            $start,
            $stop,
            Backtrace::capture(),
        ))
    }};
    (MismatchedTypes: $expected:expr, $actual:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::ColvecError::MismatchedTypes(
            $expected.to_string().into(),
            $actual.to_string().into(),
            Backtrace::capture(),
        ))
    }};
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use($crate::ColvecError::Context($msg.into(), Box::new($err)))
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use($crate::ColvecError::$variant(
            format!($fmt, $($arg),*).into(),
            Backtrace::capture(),
        ))
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::colvec_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenience macro for returning a [`ColvecError`] from the current function.
#[macro_export]
macro_rules! colvec_bail {
    ($($tt:tt)+) => {
        return Err($crate::colvec_err!($($tt)+))
    };
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::ColvecError) -> crate::ColvecError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overflowing() -> ColvecResult<()> {
        colvec_bail!(RowOverflow: 1, 3, 6)
    }

    #[test]
    fn row_overflow_message() {
        let err = overflowing().unwrap_err();
        assert!(matches!(
            err,
            ColvecError::RowOverflow {
                row: 1,
                list_size: 3,
                slot: 6,
                ..
            }
        ));
        assert!(err.to_string().starts_with(
            "values at index 6 overflow row 1 of a fixed-size list with list size 3"
        ));
    }

    #[test]
    fn context_keeps_root() {
        let err = colvec_err!(UnsupportedOperation: "no union present")
            .with_context("reading type id")
            .with_context("outer");
        assert!(matches!(
            err.root(),
            ColvecError::UnsupportedOperation(..)
        ));
        assert!(err.to_string().starts_with("outer: reading type id: unsupported operation"));
    }

    #[test]
    fn default_variant_is_invalid_argument() {
        let err = colvec_err!("bad width {}", 7);
        assert!(matches!(err, ColvecError::InvalidArgument(..)));
        assert!(err.to_string().starts_with("bad width 7"));
    }
}
