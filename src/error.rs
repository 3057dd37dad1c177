use std::fmt;

use pcbsolid_compose::ComposeError;
use pcbsolid_export::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// CLI usage error (missing args, invalid flags, unexportable output).
    Usage = 1,
    /// Input error (unreadable or invalid board/config, unknown layer, bad kind).
    Input = 2,
    /// Processing error (geometry failure while composing or exporting).
    Processing = 3,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Usage,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Input,
            message: message.into(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Processing,
            message: message.into(),
        }
    }
}

impl From<ComposeError> for CliError {
    fn from(e: ComposeError) -> Self {
        match e {
            ComposeError::Config(_) | ComposeError::NoCopperLayer => Self::input(e.to_string()),
            _ => Self::processing(e.to_string()),
        }
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::NotExtrudable(_) => Self::usage(format!("{e}; use --kind solid")),
            ExportError::Empty => Self::processing(e.to_string()),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
