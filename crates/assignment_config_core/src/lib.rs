pub mod assignment;
pub mod catalog;
pub mod dedup;
pub mod domain;
pub mod metadata;
pub mod normalize;
pub mod ports;
pub mod question;

pub use assignment::{AssignmentBody, AssignmentConfig, AssignmentType};
pub use catalog::{CatalogError, CatalogService};
pub use dedup::WarningLog;
pub use domain::{
    AssignmentTypeOption, BooleanOption, BooleanOptionSet, BooleanOptionType, CatalogOption,
    CatalogOptions, ConfigVersion, QuestionSkill, QuestionTypeOption, TaskNumber, VersionListing,
    WritingTaskTypeOption,
};
pub use metadata::{FallbackReason, MetadataSource, TypeCard, TypeMetadata};
pub use normalize::{normalize, normalize_with};
pub use ports::{CatalogStore, PortError, PortResult};
pub use question::{
    change_question_type, change_question_type_with, BooleanAnswerSets, Question, QuestionKind,
    QuestionType,
};
