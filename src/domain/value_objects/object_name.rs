use crate::domain::errors::ValidationError;

/// A validated object name (path) within a bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    /// Create a new ObjectName with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyObjectName);
        }

        if value.len() > 1024 {
            return Err(ValidationError::ObjectNameTooLong {
                actual: value.len(),
                max: 1024,
            });
        }

        // Line breaks and null bytes are rejected by the storage APIs
        for c in ['\0', '\r', '\n'] {
            if value.contains(c) {
                return Err(ValidationError::InvalidObjectNameCharacter(c));
            }
        }

        if value.starts_with('/') {
            return Err(ValidationError::ObjectNameStartsWithSlash);
        }

        // Relative path segments would escape the name's place in the bucket
        for segment in value.split('/') {
            if segment == "." || segment == ".." {
                return Err(ValidationError::ObjectNameRelativeSegment(
                    segment.to_string(),
                ));
            }
        }

        Ok(Self(value))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the directory part of the name (everything before the last '/')
    pub fn parent(&self) -> Option<String> {
        self.0.rfind('/').map(|idx| self.0[..idx].to_string())
    }

    /// Get the file name part (everything after the last '/')
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }
}

impl std::fmt::Display for ObjectName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
