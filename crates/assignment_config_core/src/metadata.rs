//! crates/assignment_config_core/src/metadata.rs
//!
//! Presentation cards for the assignment types: the built-in table used when
//! the catalog cannot supply them, and the mapping from catalog rows.

use crate::assignment::AssignmentType;
use crate::domain::AssignmentTypeOption;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern compiles")
});

/// `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

//=========================================================================================
// Cards
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTheme {
    pub accent: String,
    pub background: String,
}

/// A presentation-ready description of one assignment type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub theme: CardTheme,
}

/// Why the built-in table was served instead of catalog rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    ActiveVersionMissing,
    RequestedVersionNotFound,
    DbEmptyForVersion,
    InvalidRows,
    QueryFailed,
}

impl FallbackReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FallbackReason::ActiveVersionMissing => "active_version_missing",
            FallbackReason::RequestedVersionNotFound => "requested_version_not_found",
            FallbackReason::DbEmptyForVersion => "db_empty_for_version",
            FallbackReason::InvalidRows => "invalid_rows",
            FallbackReason::QueryFailed => "query_failed",
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataSource {
    Catalog,
    Fallback(FallbackReason),
}

/// The type-metadata payload. `version` is `None` when no version resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMetadata {
    pub version: Option<i32>,
    pub types: Vec<TypeCard>,
    pub source: MetadataSource,
}

impl TypeMetadata {
    pub fn fallback(version: Option<i32>, reason: FallbackReason) -> Self {
        Self {
            version,
            types: builtin_cards(),
            source: MetadataSource::Fallback(reason),
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self.source {
            MetadataSource::Catalog => None,
            MetadataSource::Fallback(reason) => Some(reason),
        }
    }
}

//=========================================================================================
// Built-in Table
//=========================================================================================

fn card(
    id: &str,
    title: &str,
    description: &str,
    icon: &str,
    accent: &str,
    background: &str,
) -> TypeCard {
    TypeCard {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        theme: CardTheme {
            accent: accent.to_string(),
            background: background.to_string(),
        },
    }
}

/// The card a skill gets when its catalog row is missing or unusable.
pub fn default_card(assignment_type: AssignmentType) -> TypeCard {
    match assignment_type {
        AssignmentType::Reading => card(
            "reading",
            "Reading",
            "Passages with comprehension questions",
            "book-open",
            "#2563eb",
            "#eff6ff",
        ),
        AssignmentType::Listening => card(
            "listening",
            "Listening",
            "Recordings with comprehension questions",
            "headphones",
            "#7c3aed",
            "#f5f3ff",
        ),
        AssignmentType::Writing => card(
            "writing",
            "Writing",
            "Task 1 visual report and Task 2 essay",
            "pen-line",
            "#059669",
            "#ecfdf5",
        ),
        AssignmentType::Speaking => card(
            "speaking",
            "Speaking",
            "Interview, cue card and discussion",
            "mic",
            "#ea580c",
            "#fff7ed",
        ),
    }
}

/// Defaults for rows whose id is not one of the four skills.
fn generic_card(id: &str) -> TypeCard {
    card(id, id, "Assignment", "file-text", "#4b5563", "#f9fafb")
}

pub fn builtin_cards() -> Vec<TypeCard> {
    AssignmentType::ALL.into_iter().map(default_card).collect()
}

/// Appends the built-in card of every skill the catalog rows left out.
pub fn with_missing_skills(mut cards: Vec<TypeCard>) -> Vec<TypeCard> {
    for assignment_type in AssignmentType::ALL {
        if !cards.iter().any(|card| card.id == assignment_type.as_str()) {
            cards.push(default_card(assignment_type));
        }
    }
    cards
}

//=========================================================================================
// Row Mapping
//=========================================================================================

/// Rows need a non-blank id and title to become cards at all.
pub fn is_usable_row(row: &AssignmentTypeOption) -> bool {
    !row.option.id.trim().is_empty() && !row.option.label.trim().is_empty()
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Maps a usable row to a card. Each field that is blank or malformed takes
/// the matching skill's default.
pub fn card_from_row(row: &AssignmentTypeOption) -> TypeCard {
    let id = row.option.id.trim().to_string();
    let defaults = id
        .parse::<AssignmentType>()
        .map(default_card)
        .unwrap_or_else(|_| generic_card(&id));

    let color = |value: Option<&str>, fallback: String| {
        trimmed(value)
            .filter(|c| is_hex_color(c))
            .unwrap_or(fallback)
    };

    TypeCard {
        title: trimmed(Some(row.option.label.as_str())).unwrap_or(defaults.title),
        description: trimmed(row.option.description.as_deref()).unwrap_or(defaults.description),
        icon: trimmed(row.icon.as_deref()).unwrap_or(defaults.icon),
        theme: CardTheme {
            accent: color(row.accent_color.as_deref(), defaults.theme.accent),
            background: color(row.background_color.as_deref(), defaults.theme.background),
        },
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogOption;

    fn row(id: &str, label: &str) -> AssignmentTypeOption {
        AssignmentTypeOption {
            option: CatalogOption {
                id: id.into(),
                label: label.into(),
                description: None,
                enabled: true,
                sort_order: 0,
            },
            icon: None,
            accent_color: None,
            background_color: None,
        }
    }

    #[test]
    fn hex_colors_need_three_or_six_digits() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#1A2b3C"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color(" #fff"));
    }

    #[test]
    fn malformed_fields_fall_back_per_field() {
        let mut listening = row(" listening ", "  Listening Lab ");
        listening.option.description = Some("   ".into());
        listening.icon = Some("ear".into());
        listening.accent_color = Some("purple".into());
        listening.background_color = Some(" #abc ".into());

        let card = card_from_row(&listening);
        let defaults = default_card(AssignmentType::Listening);
        assert_eq!(card.id, "listening");
        assert_eq!(card.title, "Listening Lab");
        assert_eq!(card.description, defaults.description);
        assert_eq!(card.icon, "ear");
        assert_eq!(card.theme.accent, defaults.theme.accent);
        assert_eq!(card.theme.background, "#abc");
    }

    #[test]
    fn unknown_ids_use_generic_defaults() {
        let card = card_from_row(&row("grammar", "Grammar"));
        assert_eq!(card.icon, "file-text");
        assert!(is_hex_color(&card.theme.accent));
    }

    #[test]
    fn builtin_table_covers_every_skill() {
        let cards = builtin_cards();
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["reading", "listening", "writing", "speaking"]);
        assert!(cards
            .iter()
            .all(|c| is_hex_color(&c.theme.accent) && is_hex_color(&c.theme.background)));
    }

    #[test]
    fn blank_rows_are_unusable() {
        assert!(!is_usable_row(&row("", "Reading")));
        assert!(!is_usable_row(&row("reading", "  ")));
        assert!(is_usable_row(&row("reading", "Reading")));
    }

    #[test]
    fn skills_without_rows_get_builtin_cards() {
        let cards = with_missing_skills(vec![
            card_from_row(&row("speaking", "Speaking")),
            card_from_row(&row("ielts_mock", "Mock test")),
        ]);
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["speaking", "ielts_mock", "reading", "listening", "writing"]);
        assert_eq!(cards[2], default_card(AssignmentType::Reading));
    }
}
