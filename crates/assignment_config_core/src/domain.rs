//! crates/assignment_config_core/src/domain.rs
//!
//! Defines the catalog reference data: configuration versions and the option
//! rows that belong to them. These structs are independent of any database or
//! wire format; adapters map into them and the API maps out of them.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A numbered, immutable snapshot of every catalog option table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigVersion {
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The fields every catalog row carries, whatever its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOption {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub sort_order: i32,
}

/// An assignment type row. The presentation columns feed the type metadata cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTypeOption {
    pub option: CatalogOption,
    pub icon: Option<String>,
    pub accent_color: Option<String>,
    pub background_color: Option<String>,
}

/// The skill a question type row is offered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionSkill {
    Reading,
    Listening,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTypeOption {
    pub skill: QuestionSkill,
    pub option: CatalogOption,
}

/// Writing task number; IELTS writing has exactly two tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskNumber {
    One,
    Two,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritingTaskTypeOption {
    pub task: TaskNumber,
    pub option: CatalogOption,
}

/// Which boolean answer set a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BooleanOptionType {
    TrueFalse,
    YesNo,
}

/// One selectable answer of a true/false/not-given or yes/no/not-given question.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOption {
    pub option_type: BooleanOptionType,
    pub value: String,
    pub score: f64,
    pub option: CatalogOption,
}

/// Question types partitioned by skill, each partition in `sort_order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionTypesBySkill {
    pub reading: Vec<CatalogOption>,
    pub listening: Vec<CatalogOption>,
}

/// Writing task types partitioned by task number, each partition in `sort_order`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WritingTaskTypesByTask {
    pub task1: Vec<CatalogOption>,
    pub task2: Vec<CatalogOption>,
}

/// The aggregate configuration-options payload for one resolved version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    pub version: ConfigVersion,
    pub assignment_types: Vec<AssignmentTypeOption>,
    pub question_types: QuestionTypesBySkill,
    pub writing_task_types: WritingTaskTypesByTask,
    pub speaking_part_types: Vec<CatalogOption>,
    pub completion_formats: Vec<CatalogOption>,
    pub sample_timing_options: Vec<CatalogOption>,
}

/// The enabled answers of one boolean option set.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOptionSet {
    pub option_type: BooleanOptionType,
    pub version: i32,
    pub options: Vec<BooleanOption>,
}

impl BooleanOptionSet {
    /// The answer values in display order.
    pub fn values(&self) -> Vec<String> {
        self.options.iter().map(|o| o.value.clone()).collect()
    }
}

/// Every known version plus whichever one is currently active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionListing {
    pub versions: Vec<ConfigVersion>,
    pub active_version: Option<i32>,
}

//=========================================================================================
// Discriminant Parsing
//=========================================================================================

/// Returned when a stored or requested discriminant has no matching variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownDiscriminant {
    pub kind: &'static str,
    pub value: String,
}

impl QuestionSkill {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionSkill::Reading => "reading",
            QuestionSkill::Listening => "listening",
        }
    }
}

impl FromStr for QuestionSkill {
    type Err = UnknownDiscriminant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(QuestionSkill::Reading),
            "listening" => Ok(QuestionSkill::Listening),
            other => Err(UnknownDiscriminant {
                kind: "skill type",
                value: other.to_string(),
            }),
        }
    }
}

impl TaskNumber {
    pub fn as_number(self) -> i16 {
        match self {
            TaskNumber::One => 1,
            TaskNumber::Two => 2,
        }
    }

    pub fn from_number(n: i16) -> Result<Self, UnknownDiscriminant> {
        match n {
            1 => Ok(TaskNumber::One),
            2 => Ok(TaskNumber::Two),
            other => Err(UnknownDiscriminant {
                kind: "task number",
                value: other.to_string(),
            }),
        }
    }
}

impl BooleanOptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOptionType::TrueFalse => "true_false",
            BooleanOptionType::YesNo => "yes_no",
        }
    }
}

impl FromStr for BooleanOptionType {
    type Err = UnknownDiscriminant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true_false" => Ok(BooleanOptionType::TrueFalse),
            "yes_no" => Ok(BooleanOptionType::YesNo),
            other => Err(UnknownDiscriminant {
                kind: "option type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BooleanOptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
