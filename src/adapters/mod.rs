pub mod firebase_storage;
pub mod object_storage;
