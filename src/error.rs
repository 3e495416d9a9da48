use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading and aggregating a JaCoCo report
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("could not read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed XML: {0}")]
    MalformedInput(String),

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> has a non-integer '{attribute}' attribute: {value:?}")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("No LINE counter found in jacoco XML")]
    NoCoverageData,
}

impl ExportError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::InputNotFound(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExportError::InputNotFound(PathBuf::from("x.xml")).exit_code(), 2);
        assert_eq!(ExportError::NoCoverageData.exit_code(), 1);
        assert_eq!(ExportError::MalformedInput("bad".into()).exit_code(), 1);
    }

    #[test]
    fn test_no_coverage_message() {
        assert_eq!(
            ExportError::NoCoverageData.to_string(),
            "No LINE counter found in jacoco XML"
        );
    }
}
