mod object_storage;

pub use object_storage::{ByteStream, ObjectRead, ObjectStorage};
