//! nutricare-storage
//!
//! Per-user JSON document storage over S3. Thin wrapper around the AWS S3
//! SDK: byte-level operations in [`objects`], document-level operations in
//! [`documents`].

pub mod client;
pub mod documents;
pub mod error;
pub mod objects;
