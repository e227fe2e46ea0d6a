//! crates/assignment_config_core/src/catalog.rs
//!
//! Version resolution and the read services over the catalog tables.

use crate::dedup::WarningLog;
use crate::domain::{
    BooleanOptionSet, BooleanOptionType, CatalogOption, CatalogOptions, ConfigVersion,
    QuestionSkill, QuestionTypeOption, QuestionTypesBySkill, TaskNumber, VersionListing,
    WritingTaskTypeOption, WritingTaskTypesByTask,
};
use crate::metadata::{
    card_from_row, is_usable_row, with_missing_skills, FallbackReason, MetadataSource,
    TypeMetadata,
};
use crate::ports::{CatalogStore, PortError, PortResult};
use std::sync::Arc;
use tracing::{debug, warn};

const TYPE_METADATA_KIND: &str = "type_metadata";
const CONFIG_VERSION_KIND: &str = "config_version";

/// Outcomes of the catalog services other than success.
///
/// Everything except `Store` is an expected, routine result.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Config version {0} not found")]
    VersionNotFound(i32),
    #[error("No active config version")]
    NoActiveVersion,
    #[error("No config versions exist")]
    NoVersions,
    #[error("No enabled {option_type} options for config version {version}")]
    OptionsNotFound {
        option_type: BooleanOptionType,
        version: i32,
    },
    #[error("Catalog store error: {0}")]
    Store(#[from] PortError),
}

//=========================================================================================
// The Main Service Struct
//=========================================================================================

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    warnings: Arc<WarningLog>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, warnings: Arc<WarningLog>) -> Self {
        Self { store, warnings }
    }

    /// Looks up `requested` when given, otherwise the active version.
    pub async fn resolve_version(
        &self,
        requested: Option<i32>,
    ) -> Result<ConfigVersion, CatalogError> {
        match requested {
            Some(version) => self
                .store
                .find_version(version)
                .await?
                .ok_or(CatalogError::VersionNotFound(version)),
            None => self.active_version().await?.ok_or(CatalogError::NoActiveVersion),
        }
    }

    /// The newest version flagged active. Several active rows are a data
    /// anomaly; the newest one wins.
    async fn active_version(&self) -> PortResult<Option<ConfigVersion>> {
        let active = self.store.find_active_versions().await?;
        if active.len() > 1
            && self.warnings.first_occurrence(CONFIG_VERSION_KIND, "multiple_active")
        {
            let versions: Vec<i32> = active.iter().map(|v| v.version).collect();
            warn!(?versions, "Multiple config versions are flagged active; using the newest");
        }
        Ok(active.into_iter().max_by_key(|v| v.version))
    }

    /// Reads every catalog table for `version` concurrently and assembles the
    /// aggregate. Any failed read fails the whole fetch.
    pub async fn fetch_catalog(
        &self,
        version: ConfigVersion,
    ) -> Result<CatalogOptions, CatalogError> {
        let v = version.version;
        let (
            assignment_types,
            question_types,
            writing_task_types,
            speaking_part_types,
            completion_formats,
            sample_timing_options,
        ) = futures::try_join!(
            self.store.assignment_types(v),
            self.store.question_types(v),
            self.store.writing_task_types(v),
            self.store.speaking_part_types(v),
            self.store.completion_formats(v),
            self.store.sample_timing_options(v),
        )?;

        let mut assignment_types = assignment_types;
        assignment_types.sort_by_key(|row| row.option.sort_order);

        debug!(version = v, "Catalog options fetched");
        Ok(CatalogOptions {
            version,
            assignment_types,
            question_types: partition_question_types(question_types),
            writing_task_types: partition_writing_task_types(writing_task_types),
            speaking_part_types: by_sort_order(speaking_part_types),
            completion_formats: by_sort_order(completion_formats),
            sample_timing_options: by_sort_order(sample_timing_options),
        })
    }

    /// Resolves the version, then fetches its catalog.
    pub async fn catalog_for(
        &self,
        requested: Option<i32>,
    ) -> Result<CatalogOptions, CatalogError> {
        let version = self.resolve_version(requested).await?;
        self.fetch_catalog(version).await
    }

    /// Every version, newest first, with the one currently in effect.
    pub async fn list_versions(&self) -> Result<VersionListing, CatalogError> {
        let mut versions = self.store.list_versions().await?;
        if versions.is_empty() {
            return Err(CatalogError::NoVersions);
        }
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        let active_version = versions.iter().find(|v| v.is_active).map(|v| v.version);
        Ok(VersionListing {
            versions,
            active_version,
        })
    }

    /// The enabled answers of one boolean option set, in display order.
    pub async fn fetch_boolean_options(
        &self,
        option_type: BooleanOptionType,
        requested: Option<i32>,
    ) -> Result<BooleanOptionSet, CatalogError> {
        let version = self.resolve_version(requested).await?;
        let mut options: Vec<_> = self
            .store
            .boolean_options(version.version, option_type)
            .await?
            .into_iter()
            .filter(|o| o.option.enabled && o.option_type == option_type)
            .collect();
        if options.is_empty() {
            return Err(CatalogError::OptionsNotFound {
                option_type,
                version: version.version,
            });
        }
        options.sort_by_key(|o| o.option.sort_order);
        Ok(BooleanOptionSet {
            option_type,
            version: version.version,
            options,
        })
    }

    /// Type cards for `requested` or the active version.
    ///
    /// Never fails: when the catalog cannot provide usable rows the built-in
    /// table is returned, tagged with the reason.
    pub async fn resolve_type_metadata(&self, requested: Option<i32>) -> TypeMetadata {
        let lookup = match requested {
            Some(number) => self
                .store
                .find_version(number)
                .await
                .map(|found| found.ok_or(FallbackReason::RequestedVersionNotFound)),
            None => self
                .active_version()
                .await
                .map(|found| found.ok_or(FallbackReason::ActiveVersionMissing)),
        };
        let version = match lookup {
            Ok(Ok(version)) => version,
            Ok(Err(reason)) => return self.metadata_fallback(None, requested, reason, None),
            Err(e) => {
                let reason = FallbackReason::QueryFailed;
                return self.metadata_fallback(None, requested, reason, Some(&e));
            }
        };
        let number = Some(version.version);

        let rows = match self.store.assignment_types(version.version).await {
            Ok(rows) => rows,
            Err(e) => {
                let reason = FallbackReason::QueryFailed;
                return self.metadata_fallback(number, requested, reason, Some(&e));
            }
        };
        let mut rows: Vec<_> = rows.into_iter().filter(|row| row.option.enabled).collect();
        if rows.is_empty() {
            let reason = FallbackReason::DbEmptyForVersion;
            return self.metadata_fallback(number, requested, reason, None);
        }
        if !rows.iter().all(is_usable_row) {
            return self.metadata_fallback(number, requested, FallbackReason::InvalidRows, None);
        }
        rows.sort_by_key(|row| row.option.sort_order);

        TypeMetadata {
            version: number,
            types: with_missing_skills(rows.iter().map(card_from_row).collect()),
            source: MetadataSource::Catalog,
        }
    }

    fn metadata_fallback(
        &self,
        version: Option<i32>,
        requested: Option<i32>,
        reason: FallbackReason,
        error: Option<&PortError>,
    ) -> TypeMetadata {
        let error = error.map(ToString::to_string);
        if self.warnings.first_occurrence(TYPE_METADATA_KIND, reason.as_str()) {
            warn!(
                kind = TYPE_METADATA_KIND,
                reason = %reason,
                requested_version = ?requested,
                resolved_version = ?version,
                error = ?error,
                "Serving built-in type metadata"
            );
        } else {
            debug!(
                kind = TYPE_METADATA_KIND,
                reason = %reason,
                "Serving built-in type metadata (repeat)"
            );
        }
        TypeMetadata::fallback(version, reason)
    }
}

//=========================================================================================
// Partitioning Helpers
//=========================================================================================

fn by_sort_order(mut rows: Vec<CatalogOption>) -> Vec<CatalogOption> {
    rows.sort_by_key(|row| row.sort_order);
    rows
}

fn partition_question_types(rows: Vec<QuestionTypeOption>) -> QuestionTypesBySkill {
    let mut partitioned = QuestionTypesBySkill::default();
    for row in rows {
        match row.skill {
            QuestionSkill::Reading => partitioned.reading.push(row.option),
            QuestionSkill::Listening => partitioned.listening.push(row.option),
        }
    }
    QuestionTypesBySkill {
        reading: by_sort_order(partitioned.reading),
        listening: by_sort_order(partitioned.listening),
    }
}

fn partition_writing_task_types(rows: Vec<WritingTaskTypeOption>) -> WritingTaskTypesByTask {
    let mut partitioned = WritingTaskTypesByTask::default();
    for row in rows {
        match row.task {
            TaskNumber::One => partitioned.task1.push(row.option),
            TaskNumber::Two => partitioned.task2.push(row.option),
        }
    }
    WritingTaskTypesByTask {
        task1: by_sort_order(partitioned.task1),
        task2: by_sort_order(partitioned.task2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(id: &str, sort_order: i32) -> CatalogOption {
        CatalogOption {
            id: id.into(),
            label: id.to_uppercase(),
            description: None,
            enabled: true,
            sort_order,
        }
    }

    fn question_type(skill: QuestionSkill, id: &str, sort_order: i32) -> QuestionTypeOption {
        QuestionTypeOption {
            skill,
            option: option(id, sort_order),
        }
    }

    #[test]
    fn question_types_partition_by_skill_in_sort_order() {
        let rows = vec![
            question_type(QuestionSkill::Listening, "completion", 2),
            question_type(QuestionSkill::Reading, "matching", 3),
            question_type(QuestionSkill::Reading, "multiple_choice", 1),
            question_type(QuestionSkill::Listening, "multiple_choice", 1),
        ];
        let partitioned = partition_question_types(rows);
        let reading: Vec<_> = partitioned.reading.iter().map(|o| o.id.as_str()).collect();
        let listening: Vec<_> = partitioned.listening.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(reading, ["multiple_choice", "matching"]);
        assert_eq!(listening, ["multiple_choice", "completion"]);
    }

    #[test]
    fn writing_task_types_partition_by_task() {
        let rows = vec![
            WritingTaskTypeOption { task: TaskNumber::Two, option: option("opinion", 0) },
            WritingTaskTypeOption { task: TaskNumber::One, option: option("bar_chart", 1) },
            WritingTaskTypeOption { task: TaskNumber::One, option: option("line_graph", 0) },
        ];
        let partitioned = partition_writing_task_types(rows);
        assert_eq!(partitioned.task1.len(), 2);
        assert_eq!(partitioned.task1[0].id, "line_graph");
        assert_eq!(partitioned.task2[0].id, "opinion");
    }
}
