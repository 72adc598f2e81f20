use std::io;

/// Exit classification attached to every failure that reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    ManagerNotFound,
    WrongVersion,
    BadInstallation,
    LeftoversDetected,
    BadProjectSource,
    FilesystemActionFailed,
}

impl ErrorKind {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::InvalidArgument => 1,
            Self::ManagerNotFound => 11,
            Self::WrongVersion => 12,
            Self::BadInstallation => 13,
            Self::LeftoversDetected => 14,
            Self::FilesystemActionFailed => 15,
            Self::BadProjectSource => 19,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid-argument",
            Self::ManagerNotFound => "manager-not-found",
            Self::WrongVersion => "wrong-version",
            Self::BadInstallation => "bad-installation",
            Self::LeftoversDetected => "leftovers-detected",
            Self::BadProjectSource => "bad-project-source",
            Self::FilesystemActionFailed => "filesystem-action-failed",
        }
    }
}

/// A failure raised by the engine.
///
/// The classification is optional while the error travels upward: it is set at
/// the point of first detection when the detecting layer knows what the failure
/// means, and an orchestrator fills in [`ErrorKind::FilesystemActionFailed`]
/// only when nothing below it did.
#[derive(Debug, thiserror::Error)]
#[error("{message}{}", source_suffix(.source))]
pub struct Error {
    kind: Option<ErrorKind>,
    message: String,
    #[source]
    source: Option<io::Error>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
            source: None,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Wraps an I/O failure without classifying it.
    pub fn io(source: io::Error, message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Wraps an I/O failure and classifies it in one step.
    pub fn io_as(kind: ErrorKind, source: io::Error, message: impl Into<String>) -> Self {
        Self::io(source, message).or_kind(kind)
    }

    /// Sets the classification unless one is already present.
    pub fn or_kind(mut self, kind: ErrorKind) -> Self {
        if self.kind.is_none() {
            self.kind = Some(kind);
        }
        self
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        self.kind
    }

    pub fn is_kind(&self, kind: ErrorKind) -> bool {
        self.kind == Some(kind)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The native I/O error tag, when the failure came from the filesystem.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        self.source.as_ref().map(io::Error::kind)
    }

    pub fn is_not_found(&self) -> bool {
        self.io_kind() == Some(io::ErrorKind::NotFound)
    }

    pub fn exit_code(&self) -> i32 {
        self.kind
            .unwrap_or(ErrorKind::FilesystemActionFailed)
            .exit_code()
    }
}

fn source_suffix(source: &Option<io::Error>) -> String {
    source
        .as_ref()
        .map(|err| format!(": {err}"))
        .unwrap_or_default()
}
