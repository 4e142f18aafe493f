use std::fmt::{Display, Formatter, Debug};
use std::error::Error;

pub type EmulatorResult<T> = std::result::Result<T, EmulatorError>;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EmulatorErrorKind {
    /// A device was attached over an address or port range that is already claimed.
    DeviceOverlap,
    /// A detach was requested for a device that is not attached.
    DeviceNotFound,
    /// A bus access targeted an address with no mapped device, or a device-internal bound was exceeded.
    OutOfRange,
    /// A file operation failed while loading a memory image.
    Io
}
impl EmulatorErrorKind {
    pub(self) fn as_str(&self) -> &'static str {
        match *self {
            EmulatorErrorKind::DeviceOverlap => "device range overlaps with an existing device",
            EmulatorErrorKind::DeviceNotFound => "device not found",
            EmulatorErrorKind::OutOfRange => "no device mapped to the given address",
            EmulatorErrorKind::Io => "i/o error"
        }
    }
}

#[derive(Debug)]
struct CustomError {
    kind: EmulatorErrorKind,
    error: Box<dyn Error + Send + Sync>,
}

enum ErrorSource {
    Internal(EmulatorErrorKind),
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

pub struct EmulatorError {
    source: ErrorSource
}
impl EmulatorError {
    pub fn new<E>(kind: EmulatorErrorKind, error: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>
    {
        EmulatorError {
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

    pub fn get_mut(&mut self) -> Option<&mut (dyn Error + Send + Sync)> {
        match self.source {
            ErrorSource::External(ref mut c) => Some(&mut *c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn into_inner(self) -> Option<Box<dyn Error + Send + Sync>> {
        match self.source {
            ErrorSource::External(c) => Some(c.error),
            ErrorSource::Internal(_) => None
        }
    }

    pub fn kind(&self) -> EmulatorErrorKind {
        match self.source {
            ErrorSource::External(ref c) => c.kind,
            ErrorSource::Internal(kind) => kind
        }
    }
}
impl From<EmulatorErrorKind> for EmulatorError {
    fn from(kind: EmulatorErrorKind) -> Self {
        EmulatorError {
            source: ErrorSource::Internal(kind)
        }
    }
}
impl From<std::io::Error> for EmulatorError {
    fn from(error: std::io::Error) -> Self {
        EmulatorError::new(EmulatorErrorKind::Io, error)
    }
}
impl Debug for EmulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.source, f)
    }
}
impl Display for EmulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.source {
            ErrorSource::External(ref c) => Display::fmt(&c.error, f),
            ErrorSource::Internal(kind) => write!(f, "{}", kind.as_str())
        }
    }
}
impl Error for EmulatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self.source {
            ErrorSource::Internal(_) => None,
            ErrorSource::External(ref c) => c.error.source()
        }
    }
}
