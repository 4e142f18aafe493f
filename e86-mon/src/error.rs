use std::fmt::{Display, Formatter, Debug};
use std::error::Error;

use e86_core::error::EmulatorError;

pub type MonitorResult<T> = std::result::Result<T, MonitorError>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MonitorErrorKind {
    /// A file could not be read or written.
    Io,
    /// The theme file is missing or malformed.
    Theme,
    /// The emulator core reported an error.
    Emulator
}
impl MonitorErrorKind {
    pub(self) fn as_str(&self) -> &'static str {
        match *self {
            MonitorErrorKind::Io => "i/o error",
            MonitorErrorKind::Theme => "invalid theme file",
            MonitorErrorKind::Emulator => "emulator error"
        }
    }
}

#[derive(Debug)]
struct CustomError {
    kind: MonitorErrorKind,
    error: Box<dyn Error + Send + Sync>,
}

enum ErrorSource {
    Internal(MonitorErrorKind),
    External(Box<CustomError>)
}
impl Debug for ErrorSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            ErrorSource::External(ref c) => Debug::fmt(c, f),
            ErrorSource::Internal(kind) => f.debug_tuple("Kind").field(&kind).finish()
        }
    }
}

pub struct MonitorError {
    source: ErrorSource
}
impl MonitorError {
    pub fn new<E>(kind: MonitorErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>
    {
        MonitorError {
            source: ErrorSource::External(Box::new(CustomError {
                kind,
                error: error.into()
            }))
        }
    }

    pub fn get_ref(&self) -> Option<&(dyn Error + Send + Sync)> {
        match self.source {
            ErrorSource::External(ref c) => Some(&*c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn into_inner(self) -> Option<Box<dyn Error + Send + Sync>> {
        match self.source {
            ErrorSource::External(c) => Some(c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn kind(&self) -> MonitorErrorKind {
        match self.source {
            ErrorSource::External(ref c) => c.kind,
            ErrorSource::Internal(kind) => kind
        }
    }
}
impl From<MonitorErrorKind> for MonitorError {
    fn from(kind: MonitorErrorKind) -> Self {
        MonitorError {
            source: ErrorSource::Internal(kind)
        }
    }
}
impl From<std::io::Error> for MonitorError {
    fn from(error: std::io::Error) -> Self {
        MonitorError::new(MonitorErrorKind::Io, error)
    }
}
impl From<serde_json::Error> for MonitorError {
    fn from(error: serde_json::Error) -> Self {
        MonitorError::new(MonitorErrorKind::Theme, error)
    }
}
impl From<EmulatorError> for MonitorError {
    fn from(error: EmulatorError) -> Self {
        MonitorError::new(MonitorErrorKind::Emulator, error)
    }
}
impl Debug for MonitorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.source, f)
    }
}
impl Display for MonitorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.source {
            ErrorSource::External(ref c) => Display::fmt(&c.error, f),
            ErrorSource::Internal(kind) => write!(f, "{}", kind.as_str())
        }
    }
}
impl Error for MonitorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.source {
            ErrorSource::Internal(_) => None,
            ErrorSource::External(ref c) => c.error.source()
        }
    }
}
