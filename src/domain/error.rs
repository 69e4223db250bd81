use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Schema violation: {message}")]
    Schema { message: String },

    #[error("Empty input: {message}")]
    EmptyInput { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    pub fn empty_input(message: impl Into<String>) -> Self {
        Self::EmptyInput {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}

impl From<csv::Error> for DomainError {
    fn from(err: csv::Error) -> Self {
        Self::storage(format!("CSV error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error() {
        let error = DomainError::schema("faq.csv missing columns: [\"uuid\"]");
        assert_eq!(
            error.to_string(),
            "Schema violation: faq.csv missing columns: [\"uuid\"]"
        );
    }

    #[test]
    fn test_empty_input_error() {
        let error = DomainError::empty_input("No documents provided");
        assert_eq!(error.to_string(), "Empty input: No documents provided");
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("openai", "HTTP 429");
        assert_eq!(error.to_string(), "Provider error: openai - HTTP 429");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error: DomainError = io.into();
        assert!(matches!(error, DomainError::Storage { .. }));
    }
}
