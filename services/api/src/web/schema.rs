//! services/api/src/web/schema.rs
//!
//! Outbound payloads and the check every one of them passes before it is
//! written to the wire. A payload that fails here was built from corrupted
//! catalog data; handlers report it as a server fault with the first failing
//! field path.

use assignment_config_core::domain::{
    AssignmentTypeOption, BooleanOption, BooleanOptionSet, CatalogOption, CatalogOptions,
    ConfigVersion, VersionListing,
};
use assignment_config_core::metadata::{is_hex_color, CardTheme, TypeCard, TypeMetadata};
use assignment_config_core::MetadataSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

//=========================================================================================
// Catalog Payloads
//=========================================================================================

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersionPayload {
    #[validate(range(min = 1))]
    pub version: i32,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_active: bool,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOptionPayload {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentTypePayload {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub enabled: bool,
    pub sort_order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct QuestionTypesPayload {
    #[validate(nested)]
    pub reading: Vec<CatalogOptionPayload>,
    #[validate(nested)]
    pub listening: Vec<CatalogOptionPayload>,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct WritingTaskTypesPayload {
    #[validate(nested)]
    pub task1: Vec<CatalogOptionPayload>,
    #[validate(nested)]
    pub task2: Vec<CatalogOptionPayload>,
}

/// `GET /config/ielts`
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOptionsPayload {
    #[validate(nested)]
    pub version: ConfigVersionPayload,
    #[validate(nested)]
    pub assignment_types: Vec<AssignmentTypePayload>,
    #[validate(nested)]
    pub question_types: QuestionTypesPayload,
    #[validate(nested)]
    pub writing_task_types: WritingTaskTypesPayload,
    #[validate(nested)]
    pub speaking_part_types: Vec<CatalogOptionPayload>,
    #[validate(nested)]
    pub completion_formats: Vec<CatalogOptionPayload>,
    #[validate(nested)]
    pub sample_timing_options: Vec<CatalogOptionPayload>,
}

/// `GET /config/ielts/versions`. `active_version` keeps its snake_case name on
/// the wire.
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct VersionsPayload {
    #[validate(length(min = 1), nested)]
    pub versions: Vec<ConfigVersionPayload>,
    pub active_version: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BooleanOptionPayload {
    #[validate(length(min = 1))]
    pub value: String,
    #[validate(length(min = 1))]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub score: f64,
    pub sort_order: i32,
}

/// `GET /config/ielts/question-options`
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct QuestionOptionsPayload {
    #[serde(rename = "type")]
    pub option_type: String,
    #[validate(range(min = 1))]
    pub version: i32,
    #[validate(length(min = 1), nested)]
    pub options: Vec<BooleanOptionPayload>,
}

//=========================================================================================
// Type Metadata Payloads
//=========================================================================================

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct CardThemePayload {
    #[validate(custom(function = "hex_color"))]
    pub accent: String,
    #[validate(custom(function = "hex_color"))]
    pub background: String,
}

#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
pub struct TypeCardPayload {
    #[validate(length(min = 1))]
    pub id: String,
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    #[validate(length(min = 1))]
    pub icon: String,
    #[validate(nested)]
    pub theme: CardThemePayload,
}

/// `GET /config/ielts/type-metadata`
#[derive(Debug, Clone, Serialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TypeMetadataPayload {
    pub version: Option<i32>,
    #[validate(length(min = 1), nested)]
    pub types: Vec<TypeCardPayload>,
    /// `catalog` or `fallback`.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

fn hex_color(value: &str) -> Result<(), ValidationError> {
    if is_hex_color(value) {
        Ok(())
    } else {
        Err(ValidationError::new("hex_color")
            .with_message(Cow::Borrowed("must be #rgb or #rrggbb")))
    }
}

//=========================================================================================
// Domain Conversions
//=========================================================================================

impl From<ConfigVersion> for ConfigVersionPayload {
    fn from(v: ConfigVersion) -> Self {
        Self {
            version: v.version,
            name: v.name,
            description: v.description,
            is_active: v.is_active,
            activated_at: v.activated_at,
            created_at: v.created_at,
        }
    }
}

impl From<CatalogOption> for CatalogOptionPayload {
    fn from(o: CatalogOption) -> Self {
        Self {
            id: o.id,
            label: o.label,
            description: o.description,
            enabled: o.enabled,
            sort_order: o.sort_order,
        }
    }
}

impl From<AssignmentTypeOption> for AssignmentTypePayload {
    fn from(row: AssignmentTypeOption) -> Self {
        Self {
            id: row.option.id,
            label: row.option.label,
            description: row.option.description,
            enabled: row.option.enabled,
            sort_order: row.option.sort_order,
            icon: row.icon,
            accent_color: row.accent_color,
            background_color: row.background_color,
        }
    }
}

fn payloads<T, P: From<T>>(rows: Vec<T>) -> Vec<P> {
    rows.into_iter().map(P::from).collect()
}

impl From<CatalogOptions> for ConfigOptionsPayload {
    fn from(c: CatalogOptions) -> Self {
        Self {
            version: c.version.into(),
            assignment_types: payloads(c.assignment_types),
            question_types: QuestionTypesPayload {
                reading: payloads(c.question_types.reading),
                listening: payloads(c.question_types.listening),
            },
            writing_task_types: WritingTaskTypesPayload {
                task1: payloads(c.writing_task_types.task1),
                task2: payloads(c.writing_task_types.task2),
            },
            speaking_part_types: payloads(c.speaking_part_types),
            completion_formats: payloads(c.completion_formats),
            sample_timing_options: payloads(c.sample_timing_options),
        }
    }
}

impl From<VersionListing> for VersionsPayload {
    fn from(listing: VersionListing) -> Self {
        Self {
            versions: payloads(listing.versions),
            active_version: listing.active_version,
        }
    }
}

impl From<BooleanOption> for BooleanOptionPayload {
    fn from(o: BooleanOption) -> Self {
        Self {
            value: o.value,
            label: o.option.label,
            description: o.option.description,
            score: o.score,
            sort_order: o.option.sort_order,
        }
    }
}

impl From<BooleanOptionSet> for QuestionOptionsPayload {
    fn from(set: BooleanOptionSet) -> Self {
        Self {
            option_type: set.option_type.as_str().to_string(),
            version: set.version,
            options: payloads(set.options),
        }
    }
}

impl From<CardTheme> for CardThemePayload {
    fn from(t: CardTheme) -> Self {
        Self {
            accent: t.accent,
            background: t.background,
        }
    }
}

impl From<TypeCard> for TypeCardPayload {
    fn from(c: TypeCard) -> Self {
        Self {
            id: c.id,
            title: c.title,
            description: c.description,
            icon: c.icon,
            theme: c.theme.into(),
        }
    }
}

impl From<TypeMetadata> for TypeMetadataPayload {
    fn from(m: TypeMetadata) -> Self {
        let (source, fallback_reason) = match m.source {
            MetadataSource::Catalog => ("catalog", None),
            MetadataSource::Fallback(reason) => ("fallback", Some(reason.as_str().to_string())),
        };
        Self {
            version: m.version,
            types: payloads(m.types),
            source: source.to_string(),
            fallback_reason,
        }
    }
}

//=========================================================================================
// Validation
//=========================================================================================

/// The first failing field of a payload, as a wire path such as
/// `questionTypes.listening[1].label`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

/// Passes `payload` through unchanged when it satisfies its schema.
pub fn validate_payload<T: Validate>(payload: T) -> Result<T, SchemaViolation> {
    match payload.validate() {
        Ok(()) => Ok(payload),
        Err(errors) => Err(first_violation(&errors, "").unwrap_or_else(|| SchemaViolation {
            path: "$".to_string(),
            message: "invalid payload".to_string(),
        })),
    }
}

fn first_violation(errors: &ValidationErrors, prefix: &str) -> Option<SchemaViolation> {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());
    let (field, kind) = fields.into_iter().next()?;

    let name = camel_case(&format!("{field}"));
    let path = if prefix.is_empty() { name } else { format!("{prefix}.{name}") };

    match kind {
        ValidationErrorsKind::Field(failures) => {
            let failure = failures.first()?;
            let message = failure
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("failed {} check", failure.code));
            Some(SchemaViolation { path, message })
        }
        ValidationErrorsKind::Struct(inner) => first_violation(inner, &path),
        ValidationErrorsKind::List(items) => {
            let (index, inner) = items.iter().next()?;
            first_violation(inner, &format!("{path}[{index}]"))
        }
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn version() -> ConfigVersionPayload {
        ConfigVersionPayload {
            version: 1,
            name: "IELTS 2025".into(),
            description: None,
            is_active: true,
            activated_at: None,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn option(id: &str) -> CatalogOptionPayload {
        CatalogOptionPayload {
            id: id.into(),
            label: id.to_uppercase(),
            description: None,
            enabled: true,
            sort_order: 0,
        }
    }

    fn catalog() -> ConfigOptionsPayload {
        ConfigOptionsPayload {
            version: version(),
            assignment_types: vec![],
            question_types: QuestionTypesPayload {
                reading: vec![option("multiple_choice")],
                listening: vec![option("multiple_choice"), option("completion")],
            },
            writing_task_types: WritingTaskTypesPayload { task1: vec![], task2: vec![] },
            speaking_part_types: vec![],
            completion_formats: vec![],
            sample_timing_options: vec![],
        }
    }

    #[test]
    fn well_formed_payload_passes_through() {
        assert!(validate_payload(catalog()).is_ok());
    }

    #[test]
    fn reports_first_failing_wire_path() {
        let mut payload = catalog();
        payload.question_types.listening[1].label = String::new();
        let violation = validate_payload(payload).unwrap_err();
        assert_eq!(violation.path, "questionTypes.listening[1].label");

        let mut payload = catalog();
        payload.version.version = 0;
        assert_eq!(validate_payload(payload).unwrap_err().path, "version.version");
    }

    #[test]
    fn card_colors_must_be_hex() {
        let payload = TypeMetadataPayload {
            version: Some(1),
            types: vec![TypeCardPayload {
                id: "reading".into(),
                title: "Reading".into(),
                description: String::new(),
                icon: "book-open".into(),
                theme: CardThemePayload {
                    accent: "blue".into(),
                    background: "#fff".into(),
                },
            }],
            source: "catalog".into(),
            fallback_reason: None,
        };
        let violation = validate_payload(payload).unwrap_err();
        assert_eq!(violation.path, "types[0].theme.accent");
        assert_eq!(violation.message, "must be #rgb or #rrggbb");
    }

    #[test]
    fn empty_option_sets_are_rejected() {
        let payload = QuestionOptionsPayload {
            option_type: "yes_no".into(),
            version: 2,
            options: vec![],
        };
        assert_eq!(validate_payload(payload).unwrap_err().path, "options");
    }

    #[test]
    fn builtin_metadata_is_always_valid() {
        let reason = assignment_config_core::FallbackReason::QueryFailed;
        let metadata = TypeMetadata::fallback(None, reason);
        let payload = validate_payload(TypeMetadataPayload::from(metadata)).unwrap();
        assert_eq!(payload.source, "fallback");
        assert_eq!(payload.fallback_reason.as_deref(), Some("query_failed"));
    }

    #[test]
    fn camel_case_joins_words() {
        assert_eq!(camel_case("sample_timing_options"), "sampleTimingOptions");
        assert_eq!(camel_case("task1"), "task1");
    }
}
