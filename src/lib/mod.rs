//! # Music Sorter Core Library
//!
//! Moves audio files into a `<album artist>/<album>` tree derived from their
//! embedded tags. The command-line binary is a thin layer over [`Organizer`].

pub mod audio;
pub mod config;
pub mod directory;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod organizer;
pub mod utils;

pub use config::Config;
pub use error::{ErrorKind, OrganizeError};
pub use metadata::{LoftyReader, MetadataReader};
pub use organizer::{OrganizeStats, Organizer};
