//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `CatalogStore` port from the core crate. It reads the versioned catalog
//! tables from PostgreSQL using `sqlx`.
//!
//! Rows are returned as stored; filtering on `enabled` and ordering are the
//! core services' job, though the queries already order by `sort_order`.

use assignment_config_core::domain::{
    AssignmentTypeOption, BooleanOption, BooleanOptionType, CatalogOption, ConfigVersion,
    QuestionSkill, QuestionTypeOption, TaskNumber, WritingTaskTypeOption,
};
use assignment_config_core::ports::{CatalogStore, PortError, PortResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CatalogStore` port.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    /// Creates a new `PgCatalogStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Reads one of the plain option tables. `table` is always one of our own
    /// constants, never caller input.
    async fn plain_options(
        &self,
        table: &'static str,
        version: i32,
    ) -> PortResult<Vec<CatalogOption>> {
        let sql = format!(
            "SELECT id, label, description, enabled, sort_order FROM {table} \
             WHERE config_version = $1 ORDER BY sort_order ASC"
        );
        let records = sqlx::query_as::<_, OptionRecord>(&sql)
            .bind(version)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(OptionRecord::to_domain).collect())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct VersionRecord {
    version: i32,
    name: String,
    description: Option<String>,
    is_active: bool,
    activated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}
impl VersionRecord {
    fn to_domain(self) -> ConfigVersion {
        ConfigVersion {
            version: self.version,
            name: self.name,
            description: self.description,
            is_active: self.is_active,
            activated_at: self.activated_at,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct OptionRecord {
    id: String,
    label: String,
    description: Option<String>,
    enabled: bool,
    sort_order: i32,
}
impl OptionRecord {
    fn to_domain(self) -> CatalogOption {
        CatalogOption {
            id: self.id,
            label: self.label,
            description: self.description,
            enabled: self.enabled,
            sort_order: self.sort_order,
        }
    }
}

#[derive(FromRow)]
struct AssignmentTypeRecord {
    #[sqlx(flatten)]
    option: OptionRecord,
    icon: Option<String>,
    accent_color: Option<String>,
    background_color: Option<String>,
}
impl AssignmentTypeRecord {
    fn to_domain(self) -> AssignmentTypeOption {
        AssignmentTypeOption {
            option: self.option.to_domain(),
            icon: self.icon,
            accent_color: self.accent_color,
            background_color: self.background_color,
        }
    }
}

#[derive(FromRow)]
struct QuestionTypeRecord {
    #[sqlx(flatten)]
    option: OptionRecord,
    skill_type: String,
}
impl QuestionTypeRecord {
    fn to_domain(self) -> PortResult<QuestionTypeOption> {
        let skill = self
            .skill_type
            .parse::<QuestionSkill>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(QuestionTypeOption {
            skill,
            option: self.option.to_domain(),
        })
    }
}

#[derive(FromRow)]
struct WritingTaskTypeRecord {
    #[sqlx(flatten)]
    option: OptionRecord,
    task_number: i16,
}
impl WritingTaskTypeRecord {
    fn to_domain(self) -> PortResult<WritingTaskTypeOption> {
        let task = TaskNumber::from_number(self.task_number)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(WritingTaskTypeOption {
            task,
            option: self.option.to_domain(),
        })
    }
}

#[derive(FromRow)]
struct BooleanOptionRecord {
    option_type: String,
    value: String,
    label: String,
    description: Option<String>,
    score: f64,
    enabled: bool,
    sort_order: i32,
}
impl BooleanOptionRecord {
    fn to_domain(self) -> PortResult<BooleanOption> {
        let option_type = self
            .option_type
            .parse::<BooleanOptionType>()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(BooleanOption {
            option_type,
            option: CatalogOption {
                id: self.value.clone(),
                label: self.label,
                description: self.description,
                enabled: self.enabled,
                sort_order: self.sort_order,
            },
            value: self.value,
            score: self.score,
        })
    }
}

//=========================================================================================
// `CatalogStore` Trait Implementation
//=========================================================================================

const VERSION_COLUMNS: &str = "version, name, description, is_active, activated_at, created_at";

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn find_version(&self, version: i32) -> PortResult<Option<ConfigVersion>> {
        let sql = format!("SELECT {VERSION_COLUMNS} FROM config_versions WHERE version = $1");
        let record = sqlx::query_as::<_, VersionRecord>(&sql)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.map(VersionRecord::to_domain))
    }

    async fn find_active_versions(&self) -> PortResult<Vec<ConfigVersion>> {
        let sql = format!(
            "SELECT {VERSION_COLUMNS} FROM config_versions WHERE is_active ORDER BY version DESC"
        );
        let records = sqlx::query_as::<_, VersionRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(VersionRecord::to_domain).collect())
    }

    async fn list_versions(&self) -> PortResult<Vec<ConfigVersion>> {
        let sql = format!("SELECT {VERSION_COLUMNS} FROM config_versions ORDER BY version DESC");
        let records = sqlx::query_as::<_, VersionRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(VersionRecord::to_domain).collect())
    }

    async fn assignment_types(&self, version: i32) -> PortResult<Vec<AssignmentTypeOption>> {
        let records = sqlx::query_as::<_, AssignmentTypeRecord>(
            "SELECT id, label, description, enabled, sort_order, \
             icon, accent_color, background_color \
             FROM assignment_types WHERE config_version = $1 ORDER BY sort_order ASC",
        )
        .bind(version)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(AssignmentTypeRecord::to_domain).collect())
    }

    async fn question_types(&self, version: i32) -> PortResult<Vec<QuestionTypeOption>> {
        let records = sqlx::query_as::<_, QuestionTypeRecord>(
            "SELECT id, label, description, enabled, sort_order, skill_type \
             FROM question_types WHERE config_version = $1 ORDER BY sort_order ASC",
        )
        .bind(version)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(QuestionTypeRecord::to_domain).collect()
    }

    async fn writing_task_types(&self, version: i32) -> PortResult<Vec<WritingTaskTypeOption>> {
        let records = sqlx::query_as::<_, WritingTaskTypeRecord>(
            "SELECT id, label, description, enabled, sort_order, task_number \
             FROM writing_task_types WHERE config_version = $1 ORDER BY sort_order ASC",
        )
        .bind(version)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(WritingTaskTypeRecord::to_domain).collect()
    }

    async fn speaking_part_types(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.plain_options("speaking_part_types", version).await
    }

    async fn completion_formats(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.plain_options("completion_formats", version).await
    }

    async fn sample_timing_options(&self, version: i32) -> PortResult<Vec<CatalogOption>> {
        self.plain_options("sample_timing_options", version).await
    }

    async fn boolean_options(
        &self,
        version: i32,
        option_type: BooleanOptionType,
    ) -> PortResult<Vec<BooleanOption>> {
        let records = sqlx::query_as::<_, BooleanOptionRecord>(
            "SELECT option_type, value, label, description, score, enabled, sort_order \
             FROM question_options WHERE config_version = $1 AND option_type = $2 \
             ORDER BY sort_order ASC",
        )
        .bind(version)
        .bind(option_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(BooleanOptionRecord::to_domain).collect()
    }
}
