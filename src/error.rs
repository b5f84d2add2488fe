use quick_xml::Error as XMLError;
use std::{str::Utf8Error, string::FromUtf8Error};

/// Wrapper around `std::Result`
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug)]
pub enum Error {
    /// [`std::io`] related error.
    /// Opening a file or reading from the byte stream failed.
    Io(std::io::Error),
    /// Decoding related error.
    /// The input is not valid UTF-8, or could not be decoded with the configured encoding.
    CannotDecode,
    /// Assorted errors while tokenizing XML: mismatched or unclosed tags,
    /// bad attribute syntax, unknown entities.
    MalformedXML(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO Error: {}", err),
            Error::CannotDecode => write!(f, "Cannot decode XML"),
            Error::MalformedXML(err) => write!(f, "Malformed XML: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<XMLError> for Error {
    fn from(err: XMLError) -> Error {
        match err {
            XMLError::EndEventMismatch { expected, found } => {
                if expected.is_empty() {
                    Error::MalformedXML(format!("Unexpected closing tag {}", found))
                } else {
                    Error::MalformedXML(format!(
                        "Closing tag mismatch. Expected {}, found {}",
                        expected, found,
                    ))
                }
            }
            XMLError::Io(err) => Error::from(err),
            XMLError::Utf8(_) => Error::CannotDecode,
            err => Error::MalformedXML(err.to_string()),
        }
    }
}

impl From<FromUtf8Error> for Error {
    fn from(_: FromUtf8Error) -> Error {
        Error::CannotDecode
    }
}

impl From<Utf8Error> for Error {
    fn from(_: Utf8Error) -> Error {
        Error::CannotDecode
    }
}

// The transcoding reader reports undecodable input as `InvalidData`.
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        match err.kind() {
            std::io::ErrorKind::InvalidData => Error::CannotDecode,
            _ => Error::Io(err),
        }
    }
}
