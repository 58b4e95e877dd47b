use std::{fmt, io, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The measurements file could not be opened.
    Open { path: PathBuf, source: io::Error },
    /// Reading from the input failed part way through.
    Read(io::Error),
    /// A record did not have the `<name>;<temp>` shape.
    MalformedRecord { record: String, reason: &'static str },
    InvalidConfig(&'static str),
    WorkerPanicked,
}

impl Error {
    pub fn malformed(record: &[u8], reason: &'static str) -> Self {
        Error::MalformedRecord {
            record: String::from_utf8_lossy(record).into_owned(),
            reason,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Open { path, .. } => write!(f, "failed to open {}", path.display()),
            Error::Read(_) => write!(f, "failed to read measurements"),
            Error::MalformedRecord { record, reason } => {
                write!(f, "malformed record {record:?}: {reason}")
            }
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Error::WorkerPanicked => write!(f, "a worker thread panicked"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { source, .. } => Some(source),
            Error::Read(source) => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Read(err)
    }
}
