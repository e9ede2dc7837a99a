/// Validation errors for domain value objects
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    // ObjectName validation errors
    EmptyObjectName,
    ObjectNameTooLong {
        actual: usize,
        max: usize,
    },
    InvalidObjectNameCharacter(char),
    ObjectNameStartsWithSlash,
    ObjectNameRelativeSegment(String),

    // BucketName validation errors
    BucketNameTooShort {
        actual: usize,
        min: usize,
    },
    BucketNameTooLong {
        actual: usize,
        max: usize,
    },
    BucketNameInvalidStart,
    BucketNameInvalidEnd,
    BucketNameInvalidCharacter(char),
    BucketNameConsecutiveDots,
    BucketNameLooksLikeIpAddress,

    // ObjectUri validation errors
    UriMissingScheme {
        uri: String,
    },
    UriMissingObject {
        uri: String,
    },

    // FetchRequest validation errors
    DateDiffRequired,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ObjectName errors
            ValidationError::EmptyObjectName => write!(f, "Object name cannot be empty"),
            ValidationError::ObjectNameTooLong { actual, max } => {
                write!(f, "Object name too long: {} bytes (max: {})", actual, max)
            }
            ValidationError::InvalidObjectNameCharacter(c) => {
                write!(f, "Invalid character in object name: {:?}", c)
            }
            ValidationError::ObjectNameStartsWithSlash => {
                write!(f, "Object name cannot start with '/'")
            }
            ValidationError::ObjectNameRelativeSegment(segment) => {
                write!(f, "Object name cannot contain the path segment '{}'", segment)
            }

            // BucketName errors
            ValidationError::BucketNameTooShort { actual, min } => {
                write!(
                    f,
                    "Bucket name too short: {} characters (min: {})",
                    actual, min
                )
            }
            ValidationError::BucketNameTooLong { actual, max } => {
                write!(
                    f,
                    "Bucket name too long: {} characters (max: {})",
                    actual, max
                )
            }
            ValidationError::BucketNameInvalidStart => {
                write!(f, "Bucket name must start with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidEnd => {
                write!(f, "Bucket name must end with lowercase letter or number")
            }
            ValidationError::BucketNameInvalidCharacter(c) => {
                write!(
                    f,
                    "Invalid character in bucket name: '{}'. Only lowercase letters, numbers, hyphens, underscores, and dots allowed",
                    c
                )
            }
            ValidationError::BucketNameConsecutiveDots => {
                write!(f, "Bucket name cannot contain consecutive dots")
            }
            ValidationError::BucketNameLooksLikeIpAddress => {
                write!(f, "Bucket name cannot be formatted as an IP address")
            }

            // ObjectUri errors
            ValidationError::UriMissingScheme { uri } => {
                write!(f, "Object URI must start with 'gs://': {}", uri)
            }
            ValidationError::UriMissingObject { uri } => {
                write!(f, "Object URI has no object part after the bucket: {}", uri)
            }

            // FetchRequest errors
            ValidationError::DateDiffRequired => {
                write!(f, "A datediff value is required when '$DATEDIFF' is used")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
