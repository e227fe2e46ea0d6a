use assignment_config_core::domain::{
    AssignmentTypeOption, BooleanOption, BooleanOptionType, CatalogOption, ConfigVersion,
    QuestionSkill, QuestionTypeOption, TaskNumber, WritingTaskTypeOption,
};
use assignment_config_core::metadata::default_card;
use assignment_config_core::{
    AssignmentType, BooleanAnswerSets, CatalogError, CatalogService, CatalogStore,
    FallbackReason, MetadataSource, PortError, PortResult, WarningLog,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::sync::Arc;

//=========================================================================================
// In-memory Catalog
//=========================================================================================

#[derive(Default)]
struct MemoryCatalog {
    versions: Vec<ConfigVersion>,
    assignment_types: Vec<(i32, AssignmentTypeOption)>,
    question_types: Vec<(i32, QuestionTypeOption)>,
    writing_task_types: Vec<(i32, WritingTaskTypeOption)>,
    speaking_part_types: Vec<(i32, CatalogOption)>,
    completion_formats: Vec<(i32, CatalogOption)>,
    sample_timing_options: Vec<(i32, CatalogOption)>,
    boolean_options: Vec<(i32, BooleanOption)>,
    fail_option_reads: bool,
    fail_version_reads: bool,
}

fn rows_for<T: Clone>(rows: &[(i32, T)], version: i32) -> Vec<T> {
    rows.iter()
        .filter(|(v, _)| *v == version)
        .map(|(_, row)| row.clone())
        .collect()
}

impl MemoryCatalog {
    fn check_options(&self) -> PortResult<()> {
        if self.fail_option_reads {
            return Err(PortError::Unexpected("connection reset".into()));
        }
        Ok(())
    }

    fn check_versions(&self) -> PortResult<()> {
        if self.fail_version_reads {
            return Err(PortError::Unexpected("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn find_version(&self, version: i32) -> PortResult<Option<ConfigVersion>> {
        self.check_versions()?;
        Ok(self.versions.iter().find(|v| v.version == version).cloned())
    }

    async fn find_active_versions(&self) -> PortResult<Vec<ConfigVersion>> {
        self.check_versions()?;
        Ok(self.versions.iter().filter(|v| v.is_active).cloned().collect())
    }

    async fn list_versions(&self) -> PortResult<Vec<ConfigVersion>> {
        self.check_versions()?;
        Ok(self.versions.clone())
    }

    async fn assignment_types(&self, version: i32) -> PortResult<Vec<AssignmentTypeOption>> {
        self.check_options()?;
        Ok(rows_for(&self.assignment_types, version))
    }

    async fn question_types(&self, version: i32) -> PortResult<Vec<QuestionTypeOption>> {
        self.check_options()?;
        Ok(rows_for(&self.question_types, version))
    }

    async fn writing_task_types(&self, version: i32) -> PortResult<Vec<WritingTaskTypeOption>> {
        self.check_options()?;
        Ok(rows_for(&self.writing_task_types, version))
    }

    async fn speaking_part_types(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.check_options()?;
        Ok(rows_for(&self.speaking_part_types, version))
    }

    async fn completion_formats(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.check_options()?;
        Ok(rows_for(&self.completion_formats, version))
    }

    async fn sample_timing_options(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.check_options()?;
        Ok(rows_for(&self.sample_timing_options, version))
    }

    async fn boolean_options(
        &self,
        version: i32,
        option_type: BooleanOptionType,
    ) -> PortResult<Vec<BooleanOption>> {
        self.check_options()?;
        Ok(rows_for(&self.boolean_options, version)
            .into_iter()
            .filter(|o| o.option_type == option_type)
            .collect())
    }
}

//=========================================================================================
// Fixtures
//=========================================================================================

fn version(number: i32, is_active: bool) -> ConfigVersion {
    ConfigVersion {
        version: number,
        name: format!("IELTS v{number}"),
        description: None,
        is_active,
        activated_at: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, number as u32, 9, 0, 0).unwrap(),
    }
}

fn option(id: &str, sort_order: i32) -> CatalogOption {
    CatalogOption {
        id: id.into(),
        label: id.replace('_', " "),
        description: None,
        enabled: true,
        sort_order,
    }
}

fn assignment_type(id: &str, label: &str, sort_order: i32) -> AssignmentTypeOption {
    AssignmentTypeOption {
        option: CatalogOption {
            label: label.into(),
            ..option(id, sort_order)
        },
        icon: None,
        accent_color: None,
        background_color: None,
    }
}

fn question_type(skill: QuestionSkill, id: &str, sort_order: i32) -> QuestionTypeOption {
    QuestionTypeOption {
        skill,
        option: option(id, sort_order),
    }
}

fn boolean(
    option_type: BooleanOptionType,
    value: &str,
    sort_order: i32,
    enabled: bool,
) -> BooleanOption {
    BooleanOption {
        option_type,
        value: value.into(),
        score: if sort_order == 0 { 1.0 } else { 0.0 },
        option: CatalogOption {
            enabled,
            ..option(value, sort_order)
        },
    }
}

fn service(store: MemoryCatalog) -> (CatalogService, Arc<WarningLog>) {
    let warnings = Arc::new(WarningLog::new());
    (CatalogService::new(Arc::new(store), warnings.clone()), warnings)
}

//=========================================================================================
// Version Resolution
//=========================================================================================

#[tokio::test]
async fn missing_requested_version_is_not_found() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, false), version(2, false), version(3, true)],
        ..Default::default()
    });

    let result = catalog.resolve_version(Some(5)).await;
    assert!(matches!(result, Err(CatalogError::VersionNotFound(5))));
}

#[tokio::test]
async fn newest_active_version_wins_when_several_are_flagged() {
    let (catalog, warnings) = service(MemoryCatalog {
        versions: vec![version(1, true), version(4, true), version(2, false), version(3, true)],
        ..Default::default()
    });

    let resolved = catalog.resolve_version(None).await.unwrap();
    assert_eq!(resolved.version, 4);
    assert!(!warnings.first_occurrence("config_version", "multiple_active"));
}

#[tokio::test]
async fn no_active_version_is_reported() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, false)],
        ..Default::default()
    });

    assert!(matches!(catalog.resolve_version(None).await, Err(CatalogError::NoActiveVersion)));
}

#[tokio::test]
async fn version_listing_is_newest_first() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, false), version(3, false), version(2, true)],
        ..Default::default()
    });

    let listing = catalog.list_versions().await.unwrap();
    let numbers: Vec<_> = listing.versions.iter().map(|v| v.version).collect();
    assert_eq!(numbers, [3, 2, 1]);
    assert_eq!(listing.active_version, Some(2));

    let (empty, _) = service(MemoryCatalog::default());
    assert!(matches!(empty.list_versions().await, Err(CatalogError::NoVersions)));
}

//=========================================================================================
// Catalog Fetch
//=========================================================================================

#[tokio::test]
async fn catalog_partitions_question_and_writing_types() {
    let store = MemoryCatalog {
        versions: vec![version(1, false), version(2, true)],
        question_types: vec![
            (2, question_type(QuestionSkill::Reading, "matching_headings", 2)),
            (2, question_type(QuestionSkill::Listening, "completion", 1)),
            (2, question_type(QuestionSkill::Reading, "multiple_choice", 0)),
            (2, question_type(QuestionSkill::Reading, "true_false_not_given", 1)),
            (2, question_type(QuestionSkill::Listening, "multiple_choice", 0)),
            (1, question_type(QuestionSkill::Reading, "legacy", 0)),
        ],
        writing_task_types: vec![
            (2, WritingTaskTypeOption { task: TaskNumber::One, option: option("line_graph", 0) }),
            (2, WritingTaskTypeOption { task: TaskNumber::Two, option: option("discussion", 0) }),
        ],
        completion_formats: vec![(2, option("summary", 1)), (2, option("table", 0))],
        ..Default::default()
    };
    let (catalog, _) = service(store);

    let resolved = catalog.resolve_version(Some(2)).await.unwrap();
    let options = catalog.fetch_catalog(resolved).await.unwrap();

    assert_eq!(options.version.version, 2);
    assert_eq!(options.question_types.reading.len(), 3);
    assert_eq!(options.question_types.listening.len(), 2);
    assert_eq!(options.question_types.reading[0].id, "multiple_choice");
    assert_eq!(options.writing_task_types.task1[0].id, "line_graph");
    assert_eq!(options.writing_task_types.task2[0].id, "discussion");
    let formats: Vec<_> = options.completion_formats.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(formats, ["table", "summary"]);
}

#[tokio::test]
async fn any_failed_read_fails_the_whole_fetch() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, true)],
        fail_option_reads: true,
        ..Default::default()
    });

    let result = catalog.catalog_for(None).await;
    assert!(matches!(result, Err(CatalogError::Store(_))));
}

//=========================================================================================
// Boolean Options
//=========================================================================================

#[tokio::test]
async fn boolean_options_are_enabled_rows_in_order() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, true)],
        boolean_options: vec![
            (1, boolean(BooleanOptionType::YesNo, "not_given", 2, true)),
            (1, boolean(BooleanOptionType::YesNo, "yes", 0, true)),
            (1, boolean(BooleanOptionType::YesNo, "maybe", 1, false)),
            (1, boolean(BooleanOptionType::YesNo, "no", 1, true)),
            (1, boolean(BooleanOptionType::TrueFalse, "true", 0, true)),
        ],
        ..Default::default()
    });

    let set = catalog
        .fetch_boolean_options(BooleanOptionType::YesNo, None)
        .await
        .unwrap();
    assert_eq!(set.version, 1);
    assert_eq!(set.values(), ["yes", "no", "not_given"]);

    let answers = BooleanAnswerSets::from_option_sets([&set]);
    assert_eq!(answers.yes_no, ["yes", "no", "not_given"]);
}

#[tokio::test]
async fn empty_boolean_set_is_not_found() {
    let (catalog, _) = service(MemoryCatalog {
        versions: vec![version(1, true)],
        boolean_options: vec![(1, boolean(BooleanOptionType::TrueFalse, "true", 0, false))],
        ..Default::default()
    });

    let result = catalog.fetch_boolean_options(BooleanOptionType::TrueFalse, Some(1)).await;
    assert!(matches!(
        result,
        Err(CatalogError::OptionsNotFound { option_type: BooleanOptionType::TrueFalse, version: 1 })
    ));
}

//=========================================================================================
// Type Metadata
//=========================================================================================

#[tokio::test]
async fn missing_requested_version_falls_back_and_warns_once() {
    let (catalog, warnings) = service(MemoryCatalog {
        versions: vec![version(1, true)],
        ..Default::default()
    });

    let first = catalog.resolve_type_metadata(Some(99)).await;
    assert_eq!(first.fallback_reason(), Some(FallbackReason::RequestedVersionNotFound));
    assert_eq!(first.types.len(), 4);
    assert_eq!(first.version, None);

    let second = catalog.resolve_type_metadata(Some(99)).await;
    assert_eq!(second, first);
    assert_eq!(warnings.recorded(), 1);
    assert!(!warnings.first_occurrence("type_metadata", "requested_version_not_found"));
}

#[tokio::test]
async fn every_failure_path_still_returns_four_cards() {
    let cases = [
        (
            MemoryCatalog { versions: vec![version(1, false)], ..Default::default() },
            None,
            FallbackReason::ActiveVersionMissing,
        ),
        (
            MemoryCatalog { versions: vec![version(1, true)], ..Default::default() },
            None,
            FallbackReason::DbEmptyForVersion,
        ),
        (
            MemoryCatalog {
                versions: vec![version(1, true)],
                assignment_types: vec![
                    (1, assignment_type("reading", "Reading", 0)),
                    (1, assignment_type("listening", "   ", 1)),
                ],
                ..Default::default()
            },
            None,
            FallbackReason::InvalidRows,
        ),
        (
            MemoryCatalog {
                versions: vec![version(1, true)],
                fail_option_reads: true,
                ..Default::default()
            },
            Some(1),
            FallbackReason::QueryFailed,
        ),
        (
            MemoryCatalog { fail_version_reads: true, ..Default::default() },
            None,
            FallbackReason::QueryFailed,
        ),
    ];

    for (store, requested, reason) in cases {
        let (catalog, _) = service(store);
        let metadata = catalog.resolve_type_metadata(requested).await;
        assert_eq!(metadata.fallback_reason(), Some(reason));
        assert!(metadata.types.len() >= 4);
    }
}

#[tokio::test]
async fn catalog_rows_become_cards_in_sort_order() {
    let mut writing = assignment_type("writing", "Writing Studio", 0);
    writing.accent_color = Some("#123456".into());
    writing.icon = Some("  ".into());
    let mut disabled = assignment_type("speaking", "Speaking", 2);
    disabled.option.enabled = false;

    let (catalog, warnings) = service(MemoryCatalog {
        versions: vec![version(3, true)],
        assignment_types: vec![
            (3, assignment_type("reading", "Reading", 1)),
            (3, writing),
            (3, disabled),
        ],
        ..Default::default()
    });

    let metadata = catalog.resolve_type_metadata(None).await;
    assert_eq!(metadata.source, MetadataSource::Catalog);
    assert_eq!(metadata.version, Some(3));
    let ids: Vec<_> = metadata.types.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["writing", "reading", "listening", "speaking"]);
    assert_eq!(metadata.types[0].title, "Writing Studio");
    assert_eq!(metadata.types[0].theme.accent, "#123456");
    assert_eq!(metadata.types[0].icon, "pen-line");
    assert_eq!(metadata.types[2], default_card(AssignmentType::Listening));
    assert_eq!(metadata.types[3], default_card(AssignmentType::Speaking));
    assert_eq!(warnings.recorded(), 0);
}
