//! Domain error types.

/// Top-level error type for tickema.
///
/// Row-level rejections are not represented here; see
/// [`RecordError`](crate::domain::record_parser::RecordError).
#[derive(Debug, thiserror::Error)]
pub enum TickemaError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to read source {file}: {reason}")]
    SourceIo { file: String, reason: String },

    #[error("failed to write output {path}: {reason}")]
    Output { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TickemaError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TickemaError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TickemaError> for std::process::ExitCode {
    fn from(err: &TickemaError) -> Self {
        let code: u8 = match err {
            TickemaError::Io(_) => 1,
            TickemaError::ConfigParse { .. }
            | TickemaError::ConfigMissing { .. }
            | TickemaError::ConfigInvalid { .. } => 2,
            TickemaError::SourceIo { .. } => 3,
            TickemaError::Output { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_invalid_display_names_section_and_key() {
        let err = TickemaError::invalid("ema", "smoothing", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [ema] smoothing: must be positive"
        );
    }

    #[test]
    fn source_io_display() {
        let err = TickemaError::SourceIo {
            file: "day1.csv".into(),
            reason: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read source day1.csv: permission denied"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TickemaError = io.into();
        assert!(matches!(err, TickemaError::Io(_)));
    }
}
