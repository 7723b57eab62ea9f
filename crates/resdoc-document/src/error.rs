//! Error types for document construction and annotation access
//!
//! Merge, fingerprint, diff and ordering are total over well-formed
//! documents, so only construction and annotation decoding can fail here.
//! Path parsing and patch application have their own error types in
//! [`crate::path`] and [`crate::patch`].

/// Errors raised while building or inspecting documents
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Input is not mapping, sequence or scalar shaped
    #[error("invalid document shape: {0}")]
    InvalidShape(String),

    /// The last-applied annotation does not hold a well-formed document
    #[error("cannot decode annotation '{key}': {message}")]
    AnnotationDecode {
        /// Annotation key that was looked up
        key: String,
        /// Decoder diagnostic
        message: String,
    },
}

impl DocumentError {
    /// Create shape error
    pub fn invalid_shape(message: impl Into<String>) -> Self {
        Self::InvalidShape(message.into())
    }

    /// Create annotation decode error
    pub fn annotation_decode(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AnnotationDecode {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_shape_display() {
        let err = DocumentError::invalid_shape("tagged value !Ref");
        assert_eq!(err.to_string(), "invalid document shape: tagged value !Ref");
    }

    #[test]
    fn annotation_decode_display() {
        let err = DocumentError::annotation_decode("last-applied", "expected value at line 1");
        assert_eq!(
            err.to_string(),
            "cannot decode annotation 'last-applied': expected value at line 1"
        );
    }
}
