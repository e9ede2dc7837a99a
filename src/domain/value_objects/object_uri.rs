use crate::domain::{
    errors::ValidationError,
    value_objects::{BucketName, ObjectName},
};

const SCHEME: &str = "gs://";

/// A `gs://bucket/object` pair identifying one object
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUri {
    bucket: BucketName,
    name: ObjectName,
}

impl ObjectUri {
    pub fn new(bucket: BucketName, name: ObjectName) -> Self {
        Self { bucket, name }
    }

    /// Parse a `gs://bucket/object` string.
    ///
    /// The bucket is everything up to the first slash after the scheme; the
    /// rest is the object name.
    pub fn parse(uri: &str) -> Result<Self, ValidationError> {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| ValidationError::UriMissingScheme {
                uri: uri.to_string(),
            })?;

        let (bucket, name) =
            rest.split_once('/')
                .ok_or_else(|| ValidationError::UriMissingObject {
                    uri: uri.to_string(),
                })?;

        Ok(Self {
            bucket: BucketName::new(bucket.to_string())?,
            name: ObjectName::new(name.to_string())?,
        })
    }

    pub fn bucket(&self) -> &BucketName {
        &self.bucket
    }

    pub fn name(&self) -> &ObjectName {
        &self.name
    }
}

impl std::fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}/{}", SCHEME, self.bucket, self.name)
    }
}

impl std::str::FromStr for ObjectUri {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uri() {
        let uri = ObjectUri::parse("gs://my-bucket/folder/file.csv").unwrap();
        assert_eq!(uri.bucket().as_str(), "my-bucket");
        assert_eq!(uri.name().as_str(), "folder/file.csv");
    }

    #[test]
    fn test_display_round_trip() {
        let raw = "gs://data-landing/daily/2024-06-01.csv";
        let uri = ObjectUri::parse(raw).unwrap();
        assert_eq!(uri.to_string(), raw);
    }

    #[test]
    fn test_reject_other_schemes() {
        assert!(matches!(
            ObjectUri::parse("s3://bucket/file"),
            Err(ValidationError::UriMissingScheme { .. })
        ));
        assert!(matches!(
            ObjectUri::parse("bucket/file"),
            Err(ValidationError::UriMissingScheme { .. })
        ));
    }

    #[test]
    fn test_reject_bucket_only() {
        assert!(matches!(
            ObjectUri::parse("gs://bucket-only"),
            Err(ValidationError::UriMissingObject { .. })
        ));
    }

    #[test]
    fn test_invalid_parts_propagate() {
        // Empty object part
        assert!(ObjectUri::parse("gs://bucket/").is_err());
        // Bucket fails bucket validation
        assert!(ObjectUri::parse("gs://UPPER/file").is_err());
    }
}
