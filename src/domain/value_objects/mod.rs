mod bucket_name;
mod object_name;
mod object_uri;

pub use bucket_name::BucketName;
pub use object_name::ObjectName;
pub use object_uri::ObjectUri;
