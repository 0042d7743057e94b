//! Error type definitions for the fabric controller persistence layer

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for a resource
    pub fn not_found<S: Into<String>>(resource: S, id: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database connection failures
    #[error("Database connection failed: {message}")]
    ConnectionFailed { message: String },

    /// SQL query execution failures
    #[error("Query failed: {query} - {message}")]
    QueryFailed { query: String, message: String },

    /// Database errors surfaced directly from the driver
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data serialization/deserialization failures
    #[error("Serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    /// Constraint violations (unique, foreign key, etc.)
    #[error("Constraint violation: {constraint} - {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// Record not found
    #[error("Record not found: {table} with {field} = {value}")]
    RecordNotFound {
        table: String,
        field: String,
        value: String,
    },

    /// Migration failures
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed { version: String, message: String },
}

impl RepositoryError {
    /// Create a record-not-found error
    pub fn record_not_found(table: &str, field: &str, value: &str) -> Self {
        Self::RecordNotFound {
            table: table.to_string(),
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Wrap a driver error from a named query, promoting unique-violation
    /// failures into `ConstraintViolation`.
    pub fn query_failed(query: &str, error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.is_unique_violation() {
                return Self::ConstraintViolation {
                    constraint: db_error.constraint().unwrap_or("unique").to_string(),
                    message: db_error.to_string(),
                };
            }
        }

        Self::QueryFailed {
            query: query.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_errors_convert_into_app_errors() {
        let repo_error = RepositoryError::record_not_found("element_instance", "uuid", "abc");
        let app_error: AppError = repo_error.into();
        assert!(matches!(app_error, AppError::Repository(_)));
    }

    #[test]
    fn not_found_display_names_the_resource() {
        let error = AppError::not_found("element_instance", "abc");
        assert_eq!(error.to_string(), "Not found: element_instance with id abc");
    }

    #[test]
    fn row_not_found_maps_to_query_failed() {
        let error = RepositoryError::query_failed("SELECT 1", sqlx::Error::RowNotFound);
        assert!(matches!(error, RepositoryError::QueryFailed { .. }));
    }
}
