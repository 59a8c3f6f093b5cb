//! Versewise - Scripture smart search
//!
//! Searches a multi-translation Bible corpus by meaning and by exact wording.
//! Each query is classified three ways by comparing its embedding against
//! prototype phrases: which part of the canon it is scoped to, whether it
//! wants literal or conceptual retrieval, and how the answer should be
//! presented. Semantic candidates come from a vector index and are reranked
//! by lexical overlap.

pub mod app;
pub mod classify;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod prototypes;
pub mod retrieval;
pub mod session;

pub use error::{Result, VersewiseError};
