//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the configuration endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::failure::{ErrorBody, ErrorPayload, ServiceFailure};
use crate::web::schema::{
    validate_payload, AssignmentTypePayload, BooleanOptionPayload, CardThemePayload,
    CatalogOptionPayload, ConfigOptionsPayload, ConfigVersionPayload, QuestionOptionsPayload,
    QuestionTypesPayload, SchemaViolation, TypeCardPayload, TypeMetadataPayload, VersionsPayload,
    WritingTaskTypesPayload,
};
use crate::web::state::AppState;
use assignment_config_core::catalog::CatalogError;
use assignment_config_core::domain::BooleanOptionType;
use assignment_config_core::metadata::{FallbackReason, TypeMetadata};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::{IntoParams, OpenApi};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        get_config_handler,
        list_versions_handler,
        question_options_handler,
        type_metadata_handler,
    ),
    components(
        schemas(
            ConfigOptionsPayload,
            ConfigVersionPayload,
            AssignmentTypePayload,
            CatalogOptionPayload,
            QuestionTypesPayload,
            WritingTaskTypesPayload,
            VersionsPayload,
            QuestionOptionsPayload,
            BooleanOptionPayload,
            TypeMetadataPayload,
            TypeCardPayload,
            CardThemePayload,
            ErrorBody,
            ErrorPayload,
        )
    ),
    tags(
        (name = "IELTS Config API", description = "Versioned catalog of IELTS assignment configuration options.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Query Parameters
//=========================================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VersionQuery {
    /// A positive config version. The active version is used when omitted.
    pub version: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuestionOptionsQuery {
    /// `true_false` or `yes_no`.
    #[serde(rename = "type")]
    pub option_type: Option<String>,
    /// A positive config version. The active version is used when omitted.
    pub version: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Error)]
#[error("version must be a positive integer, got {0:?}")]
struct InvalidVersion(String);

/// Parses the optional `version` parameter. Absent or blank means "use the
/// active version"; anything else must be a positive integer.
fn parse_version(raw: Option<&str>) -> Result<Option<i32>, InvalidVersion> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => match value.parse::<i32>() {
            Ok(version) if version >= 1 => Ok(Some(version)),
            _ => Err(InvalidVersion(value.to_string())),
        },
    }
}

fn invalid_version(code: &'static str, raw: Option<&str>) -> ServiceFailure {
    ServiceFailure::bad_request(
        code,
        "version must be a positive integer",
        json!({ "parameter": "version", "value": raw }),
    )
}

fn schema_failure(
    code: &'static str,
    endpoint: &str,
    violation: SchemaViolation,
) -> ServiceFailure {
    error!(
        endpoint,
        path = %violation.path,
        message = %violation.message,
        "Outbound payload failed schema validation"
    );
    ServiceFailure::internal(
        code,
        "Stored configuration data is invalid",
        json!({ "path": violation.path, "message": violation.message }),
    )
}

fn store_failure(code: &'static str, endpoint: &str, e: CatalogError) -> ServiceFailure {
    error!(endpoint, error = %e, "Catalog query failed");
    ServiceFailure::internal(code, "Failed to load configuration", json!({}))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Fetch the full catalog of configuration options for one version.
#[utoipa::path(
    get,
    path = "/config/ielts",
    params(VersionQuery),
    responses(
        (status = 200, description = "Catalog for the requested or active version", body = ConfigOptionsPayload),
        (status = 400, description = "Invalid version parameter", body = ErrorBody),
        (status = 404, description = "Requested version absent or no active version", body = ErrorBody),
        (status = 500, description = "Stored data invalid or query failure", body = ErrorBody)
    )
)]
pub async fn get_config_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Result<Json<ConfigOptionsPayload>, ServiceFailure> {
    let Query(query) = query.map_err(|_| invalid_version("CONFIG_INVALID_VERSION", None))?;
    let raw = query.version;
    let requested = parse_version(raw.as_deref())
        .map_err(|_| invalid_version("CONFIG_INVALID_VERSION", raw.as_deref()))?;

    let options = app_state.catalog.catalog_for(requested).await.map_err(|e| match e {
        CatalogError::VersionNotFound(version) => {
            debug!(version, "Requested config version not found");
            ServiceFailure::not_found(
                "CONFIG_VERSION_NOT_FOUND",
                format!("Config version {version} not found"),
                json!({ "requestedVersion": version }),
            )
        }
        CatalogError::NoActiveVersion => ServiceFailure::not_found(
            "CONFIG_NOT_FOUND",
            "No active config version",
            json!({ "requestedVersion": null }),
        ),
        other => store_failure("CONFIG_QUERY_FAILED", "config", other),
    })?;

    validate_payload(ConfigOptionsPayload::from(options))
        .map(Json)
        .map_err(|v| schema_failure("CONFIG_INVALID_DATA", "config", v))
}

/// List every config version, newest first, with the active one.
#[utoipa::path(
    get,
    path = "/config/ielts/versions",
    responses(
        (status = 200, description = "All versions, newest first", body = VersionsPayload),
        (status = 404, description = "No versions exist", body = ErrorBody),
        (status = 500, description = "Stored data invalid or query failure", body = ErrorBody)
    )
)]
pub async fn list_versions_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<VersionsPayload>, ServiceFailure> {
    let listing = app_state.catalog.list_versions().await.map_err(|e| match e {
        CatalogError::NoVersions => ServiceFailure::not_found(
            "CONFIG_VERSIONS_NOT_FOUND",
            "No config versions exist",
            json!({}),
        ),
        other => store_failure("CONFIG_VERSIONS_QUERY_FAILED", "versions", other),
    })?;

    validate_payload(VersionsPayload::from(listing))
        .map(Json)
        .map_err(|v| schema_failure("CONFIG_VERSIONS_INVALID_DATA", "versions", v))
}

/// Fetch the enabled answers of a true/false or yes/no option set.
#[utoipa::path(
    get,
    path = "/config/ielts/question-options",
    params(QuestionOptionsQuery),
    responses(
        (status = 200, description = "Enabled options in display order", body = QuestionOptionsPayload),
        (status = 400, description = "Missing or unknown type, or invalid version", body = ErrorBody),
        (status = 404, description = "Version absent or no enabled options", body = ErrorBody),
        (status = 500, description = "Stored data invalid or query failure", body = ErrorBody)
    )
)]
pub async fn question_options_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<QuestionOptionsQuery>, QueryRejection>,
) -> Result<Json<QuestionOptionsPayload>, ServiceFailure> {
    let Query(query) = query.map_err(|rejection| {
        ServiceFailure::bad_request(
            "QUESTION_OPTIONS_INVALID_QUERY",
            "Malformed query string",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    let option_type = query
        .option_type
        .as_deref()
        .map(str::trim)
        .and_then(|t| t.parse::<BooleanOptionType>().ok())
        .ok_or_else(|| {
            ServiceFailure::bad_request(
                "QUESTION_OPTIONS_INVALID_QUERY",
                "type must be one of true_false, yes_no",
                json!({ "parameter": "type", "value": &query.option_type }),
            )
        })?;

    let raw = query.version.as_deref();
    let requested = parse_version(raw)
        .map_err(|_| invalid_version("QUESTION_OPTIONS_INVALID_VERSION", raw))?;

    let set = app_state
        .catalog
        .fetch_boolean_options(option_type, requested)
        .await
        .map_err(|e| match e {
            CatalogError::VersionNotFound(version) => ServiceFailure::not_found(
                "QUESTION_OPTIONS_VERSION_NOT_FOUND",
                format!("Config version {version} not found"),
                json!({ "requestedVersion": version }),
            ),
            CatalogError::NoActiveVersion => ServiceFailure::not_found(
                "QUESTION_OPTIONS_VERSION_NOT_FOUND",
                "No active config version",
                json!({ "requestedVersion": null }),
            ),
            CatalogError::OptionsNotFound { option_type, version } => ServiceFailure::not_found(
                "QUESTION_OPTIONS_NOT_FOUND",
                format!("No enabled {option_type} options for config version {version}"),
                json!({ "type": option_type.as_str(), "version": version }),
            ),
            other => store_failure("QUESTION_OPTIONS_QUERY_FAILED", "question-options", other),
        })?;

    validate_payload(QuestionOptionsPayload::from(set))
        .map(Json)
        .map_err(|v| schema_failure("QUESTION_OPTIONS_INVALID_DATA", "question-options", v))
}

/// Presentation cards for the assignment types. Never fails: the built-in
/// table is served whenever the catalog cannot supply usable rows.
#[utoipa::path(
    get,
    path = "/config/ielts/type-metadata",
    params(VersionQuery),
    responses(
        (status = 200, description = "Type cards from the catalog or the built-in table", body = TypeMetadataPayload)
    )
)]
pub async fn type_metadata_handler(
    State(app_state): State<Arc<AppState>>,
    query: Result<Query<VersionQuery>, QueryRejection>,
) -> Json<TypeMetadataPayload> {
    let raw = query.ok().and_then(|Query(q)| q.version);
    let requested = parse_version(raw.as_deref()).unwrap_or_else(|e| {
        debug!(error = %e, "Ignoring invalid type-metadata version");
        None
    });

    let metadata = app_state.catalog.resolve_type_metadata(requested).await;
    let version = metadata.version;
    match validate_payload(TypeMetadataPayload::from(metadata)) {
        Ok(payload) => Json(payload),
        Err(violation) => {
            error!(
                path = %violation.path,
                message = %violation.message,
                "Type metadata failed schema validation"
            );
            Json(TypeMetadata::fallback(version, FallbackReason::InvalidRows).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_must_be_positive_integers() {
        assert_eq!(parse_version(None), Ok(None));
        assert_eq!(parse_version(Some("  ")), Ok(None));
        assert_eq!(parse_version(Some("3")), Ok(Some(3)));
        assert_eq!(parse_version(Some(" 12 ")), Ok(Some(12)));
        assert_eq!(parse_version(Some(" 0 ")), Err(InvalidVersion("0".into())));
        assert!(parse_version(Some("-1")).is_err());
        assert!(parse_version(Some("1.5")).is_err());
        assert!(parse_version(Some("latest")).is_err());
    }
}
