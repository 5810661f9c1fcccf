//! # Error Handling
//!
//! Error types for the routeplane compiler, defined with `thiserror`.
//!
//! The compiler itself only fails on structurally absent data. Optional model
//! fields are omitted from the output rather than reported.

use std::path::PathBuf;

/// Custom result type for routeplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the routeplane compiler
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A field the compiler cannot do without is absent from the routing model
    #[error("Routing model error: {entity} is missing required field '{field}'")]
    MissingField { entity: String, field: &'static str },

    /// Settings loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors while reading a model or settings file
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// JSON (de)serialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// YAML (de)serialization errors
    #[error("YAML error: {context}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
        context: String,
    },

    /// Internal errors (e.g. a compile task that failed to join)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new missing-field error
    pub fn missing_field<E: Into<String>>(entity: E, field: &'static str) -> Self {
        Self::MissingField { entity: entity.into(), field }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap an I/O error with the path that was being read
    pub fn io_at(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io { source, context: format!("failed to read {}", path.into().display()) }
    }

    /// True when the error describes malformed routing-model data
    pub fn is_model_error(&self) -> bool {
        matches!(self, Error::MissingField { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Yaml { source: error, context: "YAML serialization failed".to_string() }
    }
}

impl From<::config::ConfigError> for Error {
    fn from(error: ::config::ConfigError) -> Self {
        Self::Config(format!("Configuration loading failed: {}", error))
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(&errors, "", &mut messages);
        messages.sort();

        Self::Config(format!("Validation failed: {}", messages.join("; ")))
    }
}

/// Flatten field errors from nested structs and lists into `path: message` lines
fn collect_validation_messages(
    errors: &validator::ValidationErrors,
    prefix: &str,
    out: &mut Vec<String>,
) {
    use validator::ValidationErrorsKind;

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() { field.to_string() } else { format!("{}.{}", prefix, field) };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                out.push(format!("{}: {}", path, messages.join(", ")));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_validation_messages(nested, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let error = Error::missing_field("listener #2", "service_port");
        assert!(error.is_model_error());
        assert_eq!(
            error.to_string(),
            "Routing model error: listener #2 is missing required field 'service_port'"
        );
    }

    #[test]
    fn test_config_error() {
        let error = Error::config("bad format");
        assert!(matches!(error, Error::Config(_)));
        assert!(!error.is_model_error());
        assert_eq!(error.to_string(), "Configuration error: bad format");
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: Error = io_error.into();
        assert!(matches!(error, Error::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Serialization { .. }));

        let yaml_error = serde_yaml::from_str::<Vec<u32>>("a: [").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(matches!(error, Error::Yaml { .. }));
    }

    #[test]
    fn test_io_at_names_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error = Error::io_at(io_error, "/tmp/model.yaml");
        assert_eq!(error.to_string(), "I/O error: failed to read /tmp/model.yaml");
    }

    #[test]
    fn test_nested_validation_errors_keep_field_path() {
        use validator::Validate;

        #[derive(Validate)]
        struct Inner {
            #[validate(length(min = 1, message = "cannot be empty"))]
            name: String,
        }

        #[derive(Validate)]
        struct Outer {
            #[validate(nested)]
            inner: Inner,
        }

        let errors = Outer { inner: Inner { name: String::new() } }.validate().unwrap_err();
        let error: Error = errors.into();
        assert_eq!(
            error.to_string(),
            "Configuration error: Validation failed: inner.name: cannot be empty"
        );
    }
}
