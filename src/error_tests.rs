//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::PipelineError;

    #[test]
    fn test_missing_column() {
        let err = PipelineError::MissingColumn("fullText".to_string());
        let msg = err.to_string();
        assert!(msg.contains("fullText"));
        assert!(msg.contains("missing"));
    }

    #[test]
    fn test_config_error() {
        let err = PipelineError::Config("Unknown backend".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_taxonomy_error() {
        let err = PipelineError::Taxonomy("empty keyword".to_string());
        assert!(err.to_string().contains("Taxonomy error"));
    }

    #[test]
    fn test_rate_limited() {
        let err = PipelineError::RateLimited { retry_after_secs: 30 };
        let msg = err.to_string();
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_scoring_failed_is_permanent() {
        let err = PipelineError::ScoringFailed {
            attempted: 12,
            last_error: "Capability unavailable: HTTP 503".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("HTTP 503"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_unavailable_includes_status() {
        let err = PipelineError::Unavailable { status: 503 };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(PipelineError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(PipelineError::Unavailable { status: 503 }.is_transient());
        assert!(!PipelineError::Unavailable { status: 400 }.is_transient());
        assert!(!PipelineError::EmptyText.is_transient());
        assert!(!PipelineError::Capability("bad label".into()).is_transient());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: PipelineError = io.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_is_debug() {
        let err = PipelineError::EmptyText;
        let debug = format!("{:?}", err);
        assert!(debug.contains("EmptyText"));
    }
}
