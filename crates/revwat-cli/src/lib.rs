//! Batch driver, configuration records, and structured logging for the
//! `revwat` command-line tool.

#![forbid(unsafe_code)]

pub mod batch;
pub mod config;
pub mod error;
pub mod structured_log;

pub use batch::BatchDriver;
pub use config::{BatchResponse, EmbedRequest, ExtractRequest, FailedImage, RemoveRequest};
pub use error::{DriverError, ImageError};
