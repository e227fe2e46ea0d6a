//! crates/assignment_config_core/src/question.rs
//!
//! The question variant model used by reading and listening sections, and the
//! transition table applied when an author switches a question's type.
//!
//! Every question type is its own `QuestionKind` variant carrying only the
//! fields that type owns, so a question can never hold two variants' fields.

use crate::domain::{BooleanOptionSet, BooleanOptionType, UnknownDiscriminant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum entries of a multiple-choice option list.
pub const MIN_CHOICE_OPTIONS: usize = 2;
/// Minimum matching statements and minimum matching options.
pub const MIN_MATCHING_ENTRIES: usize = 2;
/// Minimum labels on a diagram.
pub const MIN_DIAGRAM_LABELS: usize = 1;

const DEFAULT_MATCHING_ITEMS: usize = 3;
const DEFAULT_MATCHING_OPTIONS: usize = 4;
const DEFAULT_DIAGRAM_LABELS: usize = 3;

//=========================================================================================
// Question Types
//=========================================================================================

/// The fieldless discriminant of a question, as stored under `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalseNotGiven,
    YesNoNotGiven,
    Matching,
    MatchingHeadings,
    MatchingInformation,
    MatchingFeatures,
    DiagramLabeling,
    MapDiagramLabeling,
    Completion,
}

/// Question types grouped by the field set they carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionFamily {
    Choice,
    Boolean(BooleanOptionType),
    Matching,
    Diagram,
    Completion,
}

impl QuestionType {
    pub const ALL: [QuestionType; 10] = [
        QuestionType::MultipleChoice,
        QuestionType::TrueFalseNotGiven,
        QuestionType::YesNoNotGiven,
        QuestionType::Matching,
        QuestionType::MatchingHeadings,
        QuestionType::MatchingInformation,
        QuestionType::MatchingFeatures,
        QuestionType::DiagramLabeling,
        QuestionType::MapDiagramLabeling,
        QuestionType::Completion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalseNotGiven => "true_false_not_given",
            QuestionType::YesNoNotGiven => "yes_no_not_given",
            QuestionType::Matching => "matching",
            QuestionType::MatchingHeadings => "matching_headings",
            QuestionType::MatchingInformation => "matching_information",
            QuestionType::MatchingFeatures => "matching_features",
            QuestionType::DiagramLabeling => "diagram_labeling",
            QuestionType::MapDiagramLabeling => "map_diagram_labeling",
            QuestionType::Completion => "completion",
        }
    }

    pub fn family(self) -> QuestionFamily {
        match self {
            QuestionType::MultipleChoice => QuestionFamily::Choice,
            QuestionType::TrueFalseNotGiven => {
                QuestionFamily::Boolean(BooleanOptionType::TrueFalse)
            }
            QuestionType::YesNoNotGiven => QuestionFamily::Boolean(BooleanOptionType::YesNo),
            QuestionType::Matching
            | QuestionType::MatchingHeadings
            | QuestionType::MatchingInformation
            | QuestionType::MatchingFeatures => QuestionFamily::Matching,
            QuestionType::DiagramLabeling | QuestionType::MapDiagramLabeling => {
                QuestionFamily::Diagram
            }
            QuestionType::Completion => QuestionFamily::Completion,
        }
    }
}

impl FromStr for QuestionType {
    type Err = UnknownDiscriminant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuestionType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDiscriminant {
                kind: "question type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secondary discriminant of a completion question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFormat {
    Form,
    Note,
    Table,
    FlowChart,
    #[default]
    Summary,
}

impl CompletionFormat {
    pub const ALL: [CompletionFormat; 5] = [
        CompletionFormat::Form,
        CompletionFormat::Note,
        CompletionFormat::Table,
        CompletionFormat::FlowChart,
        CompletionFormat::Summary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CompletionFormat::Form => "form",
            CompletionFormat::Note => "note",
            CompletionFormat::Table => "table",
            CompletionFormat::FlowChart => "flow_chart",
            CompletionFormat::Summary => "summary",
        }
    }

    /// Entries a fresh completion question of this format starts with.
    pub fn default_options(self) -> usize {
        match self {
            CompletionFormat::Form | CompletionFormat::Note => 3,
            CompletionFormat::Table | CompletionFormat::FlowChart => 4,
            CompletionFormat::Summary => 5,
        }
    }

    /// A summary carries a word bank to choose from, so it needs two entries.
    pub fn min_options(self) -> usize {
        match self {
            CompletionFormat::Summary => 2,
            _ => 1,
        }
    }
}

impl FromStr for CompletionFormat {
    type Err = UnknownDiscriminant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompletionFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| UnknownDiscriminant {
                kind: "completion format",
                value: s.to_string(),
            })
    }
}

//=========================================================================================
// Question Shapes
//=========================================================================================

/// A single question inside a reading or listening section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub correct_answer: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice(ChoiceOptions),
    TrueFalseNotGiven,
    YesNoNotGiven,
    Matching(MatchingSet),
    MatchingHeadings(MatchingSet),
    MatchingInformation(MatchingSet),
    MatchingFeatures(MatchingSet),
    DiagramLabeling(DiagramSet),
    MapDiagramLabeling(DiagramSet),
    Completion(CompletionSet),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOptions {
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingSet {
    pub matching_items: Vec<MatchingItem>,
    pub matching_options: Vec<MatchingOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingItem {
    pub id: String,
    pub statement: String,
    /// `None` until the author pairs the statement with an option.
    pub match_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingOption {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSet {
    pub diagram_image_ids: Vec<String>,
    pub diagram_labels: Vec<DiagramLabel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramLabel {
    pub id: String,
    pub letter: String,
    pub position: LabelPosition,
    pub answer: String,
}

/// Label coordinates as percentages of the image's width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSet {
    pub format: CompletionFormat,
    pub options: Vec<String>,
}

//=========================================================================================
// Boolean Answer Sets
//=========================================================================================

/// The allowed `correct_answer` values of the two boolean question types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanAnswerSets {
    pub true_false: Vec<String>,
    pub yes_no: Vec<String>,
}

impl Default for BooleanAnswerSets {
    fn default() -> Self {
        Self {
            true_false: vec!["true".into(), "false".into(), "not_given".into()],
            yes_no: vec!["yes".into(), "no".into(), "not_given".into()],
        }
    }
}

impl BooleanAnswerSets {
    /// Uses the catalog's enabled values where a set is present and non-empty.
    pub fn from_option_sets<'a>(sets: impl IntoIterator<Item = &'a BooleanOptionSet>) -> Self {
        let mut answers = Self::default();
        for set in sets {
            let values = set.values();
            if values.is_empty() {
                continue;
            }
            match set.option_type {
                BooleanOptionType::TrueFalse => answers.true_false = values,
                BooleanOptionType::YesNo => answers.yes_no = values,
            }
        }
        answers
    }

    pub fn values(&self, option_type: BooleanOptionType) -> &[String] {
        match option_type {
            BooleanOptionType::TrueFalse => &self.true_false,
            BooleanOptionType::YesNo => &self.yes_no,
        }
    }

    pub fn first(&self, option_type: BooleanOptionType) -> String {
        self.values(option_type).first().cloned().unwrap_or_default()
    }

    pub fn allows(&self, option_type: BooleanOptionType, value: &str) -> bool {
        self.values(option_type).iter().any(|v| v == value)
    }
}

//=========================================================================================
// Defaults
//=========================================================================================

/// Letters for positional identifiers: A..Z, then AA, AB, ...
pub fn lettered(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

pub fn default_matching_item(index: usize) -> MatchingItem {
    MatchingItem {
        id: format!("item-{}", index + 1),
        statement: String::new(),
        match_id: None,
    }
}

pub fn default_matching_option(index: usize) -> MatchingOption {
    MatchingOption {
        id: lettered(index),
        label: String::new(),
    }
}

pub fn default_diagram_label(index: usize) -> DiagramLabel {
    let offset = 25.0 * (index % 3 + 1) as f64;
    DiagramLabel {
        id: format!("label-{}", index + 1),
        letter: lettered(index),
        position: LabelPosition {
            x: offset,
            y: offset,
        },
        answer: String::new(),
    }
}

impl MatchingSet {
    pub fn with_defaults() -> Self {
        Self {
            matching_items: (0..DEFAULT_MATCHING_ITEMS).map(default_matching_item).collect(),
            matching_options: (0..DEFAULT_MATCHING_OPTIONS)
                .map(default_matching_option)
                .collect(),
        }
    }
}

impl DiagramSet {
    pub fn with_defaults() -> Self {
        Self {
            diagram_image_ids: Vec::new(),
            diagram_labels: (0..DEFAULT_DIAGRAM_LABELS).map(default_diagram_label).collect(),
        }
    }
}

impl CompletionSet {
    pub fn with_format(format: CompletionFormat) -> Self {
        Self {
            format,
            options: vec![String::new(); format.default_options()],
        }
    }
}

impl QuestionKind {
    /// The variant for `question_type` with freshly initialized fields.
    pub fn default_for(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::MultipleChoice => QuestionKind::MultipleChoice(ChoiceOptions {
                options: vec![String::new(); MIN_CHOICE_OPTIONS],
            }),
            QuestionType::TrueFalseNotGiven => QuestionKind::TrueFalseNotGiven,
            QuestionType::YesNoNotGiven => QuestionKind::YesNoNotGiven,
            QuestionType::Matching => QuestionKind::Matching(MatchingSet::with_defaults()),
            QuestionType::MatchingHeadings => {
                QuestionKind::MatchingHeadings(MatchingSet::with_defaults())
            }
            QuestionType::MatchingInformation => {
                QuestionKind::MatchingInformation(MatchingSet::with_defaults())
            }
            QuestionType::MatchingFeatures => {
                QuestionKind::MatchingFeatures(MatchingSet::with_defaults())
            }
            QuestionType::DiagramLabeling => {
                QuestionKind::DiagramLabeling(DiagramSet::with_defaults())
            }
            QuestionType::MapDiagramLabeling => {
                QuestionKind::MapDiagramLabeling(DiagramSet::with_defaults())
            }
            QuestionType::Completion => {
                QuestionKind::Completion(CompletionSet::with_format(CompletionFormat::default()))
            }
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::MultipleChoice(_) => QuestionType::MultipleChoice,
            QuestionKind::TrueFalseNotGiven => QuestionType::TrueFalseNotGiven,
            QuestionKind::YesNoNotGiven => QuestionType::YesNoNotGiven,
            QuestionKind::Matching(_) => QuestionType::Matching,
            QuestionKind::MatchingHeadings(_) => QuestionType::MatchingHeadings,
            QuestionKind::MatchingInformation(_) => QuestionType::MatchingInformation,
            QuestionKind::MatchingFeatures(_) => QuestionType::MatchingFeatures,
            QuestionKind::DiagramLabeling(_) => QuestionType::DiagramLabeling,
            QuestionKind::MapDiagramLabeling(_) => QuestionType::MapDiagramLabeling,
            QuestionKind::Completion(_) => QuestionType::Completion,
        }
    }

    /// Re-tags a matching set when `question_type` is a matching type.
    fn matching(question_type: QuestionType, set: MatchingSet) -> Option<Self> {
        match question_type {
            QuestionType::Matching => Some(QuestionKind::Matching(set)),
            QuestionType::MatchingHeadings => Some(QuestionKind::MatchingHeadings(set)),
            QuestionType::MatchingInformation => Some(QuestionKind::MatchingInformation(set)),
            QuestionType::MatchingFeatures => Some(QuestionKind::MatchingFeatures(set)),
            _ => None,
        }
    }

    /// Re-tags a diagram set when `question_type` is a diagram-labeling type.
    fn diagram(question_type: QuestionType, set: DiagramSet) -> Option<Self> {
        match question_type {
            QuestionType::DiagramLabeling => Some(QuestionKind::DiagramLabeling(set)),
            QuestionType::MapDiagramLabeling => Some(QuestionKind::MapDiagramLabeling(set)),
            _ => None,
        }
    }
}

impl Question {
    /// A blank question of the given type.
    pub fn new(
        id: impl Into<String>,
        question_type: QuestionType,
        answers: &BooleanAnswerSets,
    ) -> Self {
        let correct_answer = match question_type.family() {
            QuestionFamily::Boolean(set) => answers.first(set),
            _ => String::new(),
        };
        Self {
            id: id.into(),
            prompt: String::new(),
            correct_answer,
            kind: QuestionKind::default_for(question_type),
        }
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }
}

//=========================================================================================
// Type Transitions
//=========================================================================================

/// Switches `question` to `new_type` using the built-in boolean answer sets.
pub fn change_question_type(question: Question, new_type: QuestionType) -> Question {
    change_question_type_with(question, new_type, &BooleanAnswerSets::default())
}

/// Switches `question` to `new_type`.
///
/// The id and prompt always survive. Within the matching family and within the
/// diagram family the variant fields and answer are carried over and only the
/// tag changes. Any other change drops the old variant's fields, initializes the
/// new variant's defaults and resets the answer: to the first allowed value for
/// a boolean type, to an empty string otherwise. Same-type changes are no-ops.
pub fn change_question_type_with(
    question: Question,
    new_type: QuestionType,
    answers: &BooleanAnswerSets,
) -> Question {
    if question.question_type() == new_type {
        return question;
    }

    let Question {
        id,
        prompt,
        correct_answer,
        kind,
    } = question;

    let carried = match kind {
        QuestionKind::Matching(set)
        | QuestionKind::MatchingHeadings(set)
        | QuestionKind::MatchingInformation(set)
        | QuestionKind::MatchingFeatures(set) => QuestionKind::matching(new_type, set),
        QuestionKind::DiagramLabeling(set) | QuestionKind::MapDiagramLabeling(set) => {
            QuestionKind::diagram(new_type, set)
        }
        QuestionKind::MultipleChoice(_)
        | QuestionKind::TrueFalseNotGiven
        | QuestionKind::YesNoNotGiven
        | QuestionKind::Completion(_) => None,
    };

    match carried {
        Some(kind) => Question {
            id,
            prompt,
            correct_answer,
            kind,
        },
        None => {
            let correct_answer = match new_type.family() {
                QuestionFamily::Boolean(set) => answers.first(set),
                _ => String::new(),
            };
            Question {
                id,
                prompt,
                correct_answer,
                kind: QuestionKind::default_for(new_type),
            }
        }
    }
}
