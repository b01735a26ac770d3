use alloc::string::{String, ToString};
use core::fmt::Display;
use std::io;

use thiserror::Error;

// -----------------------------------------------------------------------------
// StreamError

/// The input or output stream failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The input stream holds no bytes.
    #[error("input stream is empty")]
    Empty,
    /// An I/O operation failed.
    #[error("stream i/o failed: {0}")]
    Io(#[from] io::Error),
}

// -----------------------------------------------------------------------------
// ParseError

/// The reason the markup could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("no root element")]
    NoRoot,
    #[error("more than one root element")]
    MultipleRoots,
    #[error("text outside of the root element")]
    TextOutsideRoot,
    #[error("closing tag `</{found}>` does not match `<{expected}>`")]
    MismatchedTag { expected: String, found: String },
    #[error("closing tag `</{0}>` has no open element")]
    UnbalancedClose(String),
    #[error("invalid utf-8")]
    InvalidUtf8,
    /// Rejected by the markup reader: bad tag syntax, attributes or entities.
    #[error("{0}")]
    Syntax(String),
}

/// The markup is not well formed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed markup at byte {offset}: {kind}")]
pub struct ParseError {
    /// The byte offset of the offending token.
    pub offset: u64,
    /// What is wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    #[inline]
    pub(crate) fn new(offset: u64, kind: ParseErrorKind) -> Self {
        Self { offset, kind }
    }
}

// -----------------------------------------------------------------------------
// ArchiveError

/// An error that stops reading or writing an archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ArchiveError {
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A declared field names a `Type` the registry does not know.
    #[error("field `{owner}::{field}` has the unregistered type `{data_class}`")]
    TypeInformation {
        owner: &'static str,
        field: &'static str,
        data_class: String,
    },
    /// A leaf codec rejected the element text.
    #[error("cannot read `{text}` as `{data_class}`: {reason}")]
    Data {
        data_class: &'static str,
        text: String,
        reason: String,
    },
    /// A field accessor was handed an instance of another class.
    #[error("field `{owner}::{field}` cannot access the given instance")]
    FieldAccess {
        owner: &'static str,
        field: &'static str,
    },
    /// The document ended where an element was expected.
    #[error("document ended while an element was expected")]
    UnexpectedEnd,
    /// The archive was asked to read without a type registry.
    #[error("reading requires a type registry")]
    MissingRegistry,
    /// The archive was asked to read objects before parsing its stream.
    #[error("the stream has not been parsed")]
    NotParsed,
}

impl ArchiveError {
    /// Creates a [`ArchiveError::Data`].
    pub fn data(data_class: &'static str, text: &str, reason: impl Display) -> Self {
        Self::Data {
            data_class,
            text: text.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns `true` for errors confined to one element.
    ///
    /// While reading a field the owner does not declare, such an error discards the
    /// field instead of failing the archive.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::TypeInformation { .. }
                | Self::Data { .. }
                | Self::FieldAccess { .. }
                | Self::UnexpectedEnd
        )
    }
}

impl From<io::Error> for ArchiveError {
    #[inline]
    fn from(value: io::Error) -> Self {
        Self::Stream(StreamError::Io(value))
    }
}

// -----------------------------------------------------------------------------
// ArchiveWarning

/// A recoverable problem found while reading.
///
/// Warnings are logged when they occur and collected by the archive, see
/// [`Archive::warnings`](crate::persist::Archive::warnings).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArchiveWarning {
    /// The owner class does not declare the field, and did not claim its value.
    #[error("`{owner}` has no field `{field}`, its value was dropped")]
    UnknownField { owner: &'static str, field: String },
    /// An undeclared field could not be reconstructed.
    #[error("`{owner}` has no field `{field}` and it could not be read: {reason}")]
    DiscardedField {
        owner: &'static str,
        field: String,
        reason: String,
    },
    /// The `Type` attribute names nothing registered, the element was skipped.
    #[error("type `{type_name}` is not registered, the element was skipped")]
    Unallocated { type_name: String },
    /// A declared field carries another data class than the field holds.
    #[error("field `{owner}::{field}` holds `{expected}` but the markup has `{found}`")]
    DataClassMismatch {
        owner: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// The container being read does not take this element.
    #[error("`{type_name}` cannot be stored here, the element was skipped")]
    Rejected { type_name: &'static str },
}
