//! Shared types used across all modules.
//!
//! This module defines the data collected from a repository (files,
//! commits, hotspots), the aggregate context handed to generation, and
//! the document strategies. Other modules import from here rather than
//! reaching into each other's internals.

pub mod context;
pub mod document;
pub mod history;

pub use context::{FileEntry, RepositoryContext};
pub use document::{all_labels, DocumentSpec, Documents, Strategy, DOCUMENTS, EVALUATION};
pub use history::{ChangeKind, CommitHistory, CommitRecord, FileChange, FileStat};
