//! Permission-aware retrieval for RAG pipelines.
//!
//! This crate wraps the Codified access-check API and uses it to post-filter
//! documents coming out of an arbitrary retriever, so only documents the
//! requesting user is authorized to see are surfaced. The caller identity
//! travels explicitly with every retrieval call; there is no ambient or
//! task-local state to set up.
//!
//! The usual composition is: build a [`PermissionClient`], wrap your delegate
//! retriever in a [`FilteringRetriever`], then thread an [`AccessContext`]
//! through [`Retriever::retrieve`].

pub mod client;
pub mod config;
pub mod context;
pub mod logs;
pub mod retriever;
pub mod types;

pub use client::{AccessChecker, AccessError, PermissionClient};
pub use config::ClientConfig;
pub use context::{AccessContext, AccessScope};
pub use retriever::{FilteringRetriever, Retriever};
pub use types::document::ScoredDocument;
