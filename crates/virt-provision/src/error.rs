use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid VM name '{0}': must be a plain file name (no '/', '.' or '..')")]
    InvalidName(String),

    #[error("invalid arguments: {0}")]
    UnknownFlag(String),

    #[error("this tool must be run as root")]
    NotRoot,

    #[error("CPU does not support hardware virtualization (no vmx/svm flag in {0})")]
    MissingVirtualizationSupport(PathBuf),

    #[error("unsupported host OS: neither /etc/debian_version nor /etc/redhat-release found")]
    UnsupportedHostOS,

    #[error("ISO file not found: {}", .0.display())]
    SourceFileNotFound(PathBuf),

    #[error("command failed ({status}): {command}")]
    ExternalToolFailure { command: String, status: String },

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Errors caused by operator input; usage is reprinted before exit.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField(_)
                | Self::InvalidName(_)
                | Self::UnknownFlag(_)
                | Self::SourceFileNotFound(_)
        )
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
