//! crates/assignment_config_core/src/assignment.rs
//!
//! The assignment configuration: shared fields plus exactly one skill-specific
//! body, and the canonical default template for each skill.

use crate::domain::UnknownDiscriminant;
use crate::question::{BooleanAnswerSets, Question, QuestionType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PREP_SECONDS: u32 = 60;
pub const DEFAULT_TALK_SECONDS: u32 = 120;
const DEFAULT_CUE_CARD_BULLETS: usize = 3;

//=========================================================================================
// Assignment Types
//=========================================================================================

/// The skill an assignment tests; the top-level discriminant of a config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentType {
    Reading,
    Listening,
    Writing,
    Speaking,
}

impl AssignmentType {
    pub const ALL: [AssignmentType; 4] = [
        AssignmentType::Reading,
        AssignmentType::Listening,
        AssignmentType::Writing,
        AssignmentType::Speaking,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentType::Reading => "reading",
            AssignmentType::Listening => "listening",
            AssignmentType::Writing => "writing",
            AssignmentType::Speaking => "speaking",
        }
    }

    /// Exam-length time limit used when a config has none.
    pub fn default_duration_minutes(self) -> u32 {
        match self {
            AssignmentType::Reading => 60,
            AssignmentType::Listening => 30,
            AssignmentType::Writing => 60,
            AssignmentType::Speaking => 15,
        }
    }
}

impl FromStr for AssignmentType {
    type Err = UnknownDiscriminant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssignmentType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDiscriminant {
                kind: "assignment type",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for AssignmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Config Shapes
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentConfig {
    pub instructions: String,
    pub timing: Timing,
    pub attempts: Attempts,
    #[serde(flatten)]
    pub body: AssignmentBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub enabled: bool,
    pub duration_minutes: u32,
    pub enforce: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempts {
    /// `None` means unlimited attempts.
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssignmentBody {
    Reading(ReadingBody),
    Listening(ListeningBody),
    Writing(WritingBody),
    Speaking(SpeakingBody),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingBody {
    pub sections: Vec<ReadingSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingSection {
    pub id: String,
    pub title: String,
    pub passage: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListeningBody {
    pub sections: Vec<ListeningSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListeningSection {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    pub playback: Playback,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playback {
    /// When set, students may play the recording only once.
    pub limit_plays: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingBody {
    pub task1: WritingTask1,
    pub task2: WritingTask,
}

/// Fields shared by both writing tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingTask {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rubric_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_response: Option<String>,
    #[serde(default)]
    pub show_sample_to_students: bool,
    /// A sample-timing catalog id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_sample_timing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_sample_date: Option<String>,
}

/// Task 1 describes a visual, so it carries the image and its kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingTask1 {
    #[serde(flatten)]
    pub task: WritingTask,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakingBody {
    pub part1: SpeakingQuestions,
    pub part2: CueCardPart,
    pub part3: SpeakingQuestions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakingQuestions {
    pub questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueCardPart {
    pub cue_card: CueCard,
    pub prep_seconds: u32,
    pub talk_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CueCard {
    pub topic: String,
    pub bullet_points: Vec<String>,
}

//=========================================================================================
// Default Templates
//=========================================================================================

pub fn default_question(index: usize, answers: &BooleanAnswerSets) -> Question {
    Question::new(
        format!("question-{}", index + 1),
        QuestionType::MultipleChoice,
        answers,
    )
}

pub fn default_reading_section(index: usize) -> ReadingSection {
    ReadingSection {
        id: format!("section-{}", index + 1),
        title: format!("Section {}", index + 1),
        passage: String::new(),
        questions: vec![default_question(0, &BooleanAnswerSets::default())],
    }
}

pub fn default_listening_section(index: usize) -> ListeningSection {
    ListeningSection {
        id: format!("section-{}", index + 1),
        title: format!("Section {}", index + 1),
        audio_file_id: None,
        transcript: None,
        playback: Playback::default(),
        questions: vec![default_question(0, &BooleanAnswerSets::default())],
    }
}

impl SpeakingQuestions {
    pub fn placeholder() -> Self {
        Self {
            questions: vec![String::new()],
        }
    }
}

impl Default for CueCardPart {
    fn default() -> Self {
        Self {
            cue_card: CueCard {
                topic: String::new(),
                bullet_points: vec![String::new(); DEFAULT_CUE_CARD_BULLETS],
            },
            prep_seconds: DEFAULT_PREP_SECONDS,
            talk_seconds: DEFAULT_TALK_SECONDS,
        }
    }
}

impl AssignmentBody {
    pub fn default_for(assignment_type: AssignmentType) -> Self {
        match assignment_type {
            AssignmentType::Reading => AssignmentBody::Reading(ReadingBody {
                sections: vec![default_reading_section(0)],
            }),
            AssignmentType::Listening => AssignmentBody::Listening(ListeningBody {
                sections: vec![default_listening_section(0)],
            }),
            AssignmentType::Writing => AssignmentBody::Writing(WritingBody {
                task1: WritingTask1::default(),
                task2: WritingTask::default(),
            }),
            AssignmentType::Speaking => AssignmentBody::Speaking(SpeakingBody {
                part1: SpeakingQuestions::placeholder(),
                part2: CueCardPart::default(),
                part3: SpeakingQuestions::placeholder(),
            }),
        }
    }

    pub fn assignment_type(&self) -> AssignmentType {
        match self {
            AssignmentBody::Reading(_) => AssignmentType::Reading,
            AssignmentBody::Listening(_) => AssignmentType::Listening,
            AssignmentBody::Writing(_) => AssignmentType::Writing,
            AssignmentBody::Speaking(_) => AssignmentType::Speaking,
        }
    }
}

impl Timing {
    pub fn default_for(assignment_type: AssignmentType) -> Self {
        Self {
            enabled: false,
            duration_minutes: assignment_type.default_duration_minutes(),
            enforce: false,
        }
    }
}

impl AssignmentConfig {
    /// The config an author starts from after picking a skill.
    pub fn new(assignment_type: AssignmentType) -> Self {
        Self {
            instructions: String::new(),
            timing: Timing::default_for(assignment_type),
            attempts: Attempts::default(),
            body: AssignmentBody::default_for(assignment_type),
        }
    }

    pub fn assignment_type(&self) -> AssignmentType {
        self.body.assignment_type()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_speaking_config_serializes_with_type_tag() {
        let config = AssignmentConfig::new(AssignmentType::Speaking);
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["type"], json!("speaking"));
        assert_eq!(value["timing"]["durationMinutes"], json!(15));
        assert_eq!(value["attempts"]["maxAttempts"], json!(null));
        assert_eq!(value["part1"]["questions"], json!([""]));
        assert_eq!(value["part2"]["prepSeconds"], json!(60));
        assert_eq!(value["part2"]["cueCard"]["bulletPoints"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn writing_task1_flattens_shared_fields() {
        let mut config = AssignmentConfig::new(AssignmentType::Writing);
        if let AssignmentBody::Writing(body) = &mut config.body {
            body.task1.task.prompt = "Describe the chart".into();
            body.task1.visual_type = Some("bar_chart".into());
        }
        let value = serde_json::to_value(&config).unwrap();

        assert_eq!(value["task1"]["prompt"], json!("Describe the chart"));
        assert_eq!(value["task1"]["visualType"], json!("bar_chart"));
        assert!(value["task1"].get("imageFileId").is_none());
        assert!(value["task2"].get("visualType").is_none());
    }

    #[test]
    fn every_fresh_config_reports_its_type() {
        for assignment_type in AssignmentType::ALL {
            assert_eq!(AssignmentConfig::new(assignment_type).assignment_type(), assignment_type);
            assert_eq!(assignment_type.as_str().parse::<AssignmentType>(), Ok(assignment_type));
        }
    }
}
