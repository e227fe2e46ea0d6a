//! crates/assignment_config_core/src/ports.rs
//!
//! Defines the storage contract the catalog services depend on.
//! The trait forms the boundary of the hexagonal architecture, keeping the core
//! independent of the concrete database.

use crate::domain::{
    AssignmentTypeOption, BooleanOption, BooleanOptionType, CatalogOption, ConfigVersion,
    QuestionTypeOption, WritingTaskTypeOption,
};
use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Read-only access to the versioned catalog tables.
///
/// Row reads return every row stored for the version, enabled or not, in any
/// order; the services filter and sort.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // --- Versions ---
    async fn find_version(&self, version: i32) -> PortResult<Option<ConfigVersion>>;

    /// All versions flagged active, newest first.
    async fn find_active_versions(&self) -> PortResult<Vec<ConfigVersion>>;

    async fn list_versions(&self) -> PortResult<Vec<ConfigVersion>>;

    // --- Option Tables ---
    async fn assignment_types(&self, version: i32) -> PortResult<Vec<AssignmentTypeOption>>;

    async fn question_types(&self, version: i32) -> PortResult<Vec<QuestionTypeOption>>;

    async fn writing_task_types(&self, version: i32) -> PortResult<Vec<WritingTaskTypeOption>>;

    async fn speaking_part_types(&self, version: i32) -> PortResult<Vec<CatalogOption>>;

    async fn completion_formats(&self, version: i32) -> PortResult<Vec<CatalogOption>>;

    async fn sample_timing_options(&self, version: i32) -> PortResult<Vec<CatalogOption>>;

    async fn boolean_options(
        &self,
        version: i32,
        option_type: BooleanOptionType,
    ) -> PortResult<Vec<BooleanOption>>;
}
