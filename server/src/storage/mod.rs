//! Blob storage
//!
//! Product images live on the local filesystem under the work
//! directory, one file per generated UUID. Product rows store only the
//! image name; bytes never touch the database.

mod images;

pub use images::ImageStore;
