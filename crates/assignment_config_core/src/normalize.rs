//! crates/assignment_config_core/src/normalize.rs
//!
//! Repairs arbitrary persisted data into a valid `AssignmentConfig`.
//!
//! `normalize` is total: it accepts any JSON value and always returns a config
//! of the requested type. Each field is read from the raw object when it has a
//! compatible shape and taken from the type's default template otherwise.
//! Keys are looked up in camelCase first and snake_case second, so configs
//! saved by older editors still load. The output normalizes to itself.

use crate::assignment::{
    default_listening_section, default_question, default_reading_section, AssignmentBody,
    AssignmentConfig, AssignmentType, Attempts, CueCard, CueCardPart, ListeningBody,
    ListeningSection, Playback, ReadingBody, ReadingSection, SpeakingBody, SpeakingQuestions,
    Timing, WritingBody, WritingTask, WritingTask1,
};
use crate::question::{
    default_diagram_label, default_matching_item, default_matching_option, lettered,
    BooleanAnswerSets, ChoiceOptions, CompletionFormat, CompletionSet, DiagramLabel, DiagramSet,
    LabelPosition, MatchingItem, MatchingOption, MatchingSet, Question, QuestionFamily,
    QuestionKind, QuestionType, MIN_CHOICE_OPTIONS, MIN_DIAGRAM_LABELS, MIN_MATCHING_ENTRIES,
};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Normalizes `raw` against the built-in boolean answer sets.
pub fn normalize(assignment_type: AssignmentType, raw: &Value) -> AssignmentConfig {
    normalize_with(assignment_type, raw, &BooleanAnswerSets::default())
}

/// Normalizes `raw` into a config of `assignment_type`, checking boolean
/// answers against `answers`.
pub fn normalize_with(
    assignment_type: AssignmentType,
    raw: &Value,
    answers: &BooleanAnswerSets,
) -> AssignmentConfig {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);
    let defaults = AssignmentConfig::new(assignment_type);

    let mut ids = ConfigIds::default();
    let body = match assignment_type {
        AssignmentType::Reading => AssignmentBody::Reading(ReadingBody {
            sections: non_empty_elements(field(obj, "sections"), default_reading_section, |i, o| {
                reading_section(i, o, &mut ids, answers)
            }),
        }),
        AssignmentType::Listening => AssignmentBody::Listening(ListeningBody {
            sections: non_empty_elements(field(obj, "sections"), default_listening_section, |i, o| {
                listening_section(i, o, &mut ids, answers)
            }),
        }),
        AssignmentType::Writing => AssignmentBody::Writing(writing_body(obj)),
        AssignmentType::Speaking => AssignmentBody::Speaking(speaking_body(obj)),
    };

    AssignmentConfig {
        instructions: text(field(obj, "instructions"), &defaults.instructions),
        timing: timing(field(obj, "timing"), &defaults.timing),
        attempts: attempts(field(obj, "attempts"), &defaults.attempts),
        body,
    }
}

//=========================================================================================
// Shared Fields
//=========================================================================================

fn timing(raw: Option<&Value>, defaults: &Timing) -> Timing {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults.clone();
    };
    Timing {
        enabled: flag(field(obj, "enabled"), defaults.enabled),
        duration_minutes: positive_int(field(obj, "durationMinutes"), defaults.duration_minutes),
        enforce: flag(field(obj, "enforce"), defaults.enforce),
    }
}

fn attempts(raw: Option<&Value>, defaults: &Attempts) -> Attempts {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults.clone();
    };
    let max_attempts = match field(obj, "maxAttempts") {
        Some(Value::Null) => None,
        Some(value) => parse_positive(value).or(defaults.max_attempts),
        None => defaults.max_attempts,
    };
    Attempts { max_attempts }
}

//=========================================================================================
// Reading & Listening
//=========================================================================================

/// Section ids and question ids are each unique across the whole config.
#[derive(Default)]
struct ConfigIds {
    sections: UniqueIds,
    questions: UniqueIds,
    question_count: usize,
}

impl ConfigIds {
    fn section(&mut self, raw: Option<&Value>, index: usize) -> String {
        self.sections.assign(raw, format!("section-{}", index + 1))
    }

    fn question(&mut self, raw: Option<&Value>) -> String {
        self.question_count += 1;
        let positional = format!("question-{}", self.question_count);
        self.questions.assign(raw, positional)
    }
}

fn reading_section(
    index: usize,
    obj: &Map<String, Value>,
    ids: &mut ConfigIds,
    answers: &BooleanAnswerSets,
) -> ReadingSection {
    let template = default_reading_section(index);
    ReadingSection {
        id: ids.section(field(obj, "id"), index),
        title: text(field(obj, "title"), &template.title),
        passage: text(field(obj, "passage"), &template.passage),
        questions: question_list(field(obj, "questions"), ids, answers),
    }
}

fn listening_section(
    index: usize,
    obj: &Map<String, Value>,
    ids: &mut ConfigIds,
    answers: &BooleanAnswerSets,
) -> ListeningSection {
    let template = default_listening_section(index);
    let playback = match field(obj, "playback").and_then(Value::as_object) {
        Some(playback) => Playback {
            limit_plays: flag(field(playback, "limitPlays"), template.playback.limit_plays),
        },
        None => template.playback,
    };
    ListeningSection {
        id: ids.section(field(obj, "id"), index),
        title: text(field(obj, "title"), &template.title),
        audio_file_id: non_blank(field(obj, "audioFileId")),
        transcript: non_blank(field(obj, "transcript")),
        playback,
        questions: question_list(field(obj, "questions"), ids, answers),
    }
}

/// A present question array may be empty; anything else gets the template's
/// single default question.
fn question_list(
    raw: Option<&Value>,
    ids: &mut ConfigIds,
    answers: &BooleanAnswerSets,
) -> Vec<Question> {
    let empty = Map::new();
    match raw.and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .map(|item| question(item.as_object().unwrap_or(&empty), ids, answers))
            .collect(),
        None => {
            let template = default_question(0, answers);
            let id = ids.question(Some(&Value::String(template.id.clone())));
            vec![Question { id, ..template }]
        }
    }
}

fn question(
    obj: &Map<String, Value>,
    ids: &mut ConfigIds,
    answers: &BooleanAnswerSets,
) -> Question {
    let question_type = field(obj, "type")
        .and_then(Value::as_str)
        .and_then(|t| t.parse::<QuestionType>().ok())
        .unwrap_or(QuestionType::MultipleChoice);

    let id = ids.question(field(obj, "id"));
    let prompt = text(field(obj, "prompt"), "");
    let raw_answer = text(field(obj, "correctAnswer"), "");

    let correct_answer = match question_type.family() {
        QuestionFamily::Boolean(set) if answers.allows(set, &raw_answer) => raw_answer,
        QuestionFamily::Boolean(set) => answers.first(set),
        _ => raw_answer,
    };

    let kind = match question_type {
        QuestionType::MultipleChoice => QuestionKind::MultipleChoice(ChoiceOptions {
            options: padded_strings(field(obj, "options"), MIN_CHOICE_OPTIONS, MIN_CHOICE_OPTIONS),
        }),
        QuestionType::TrueFalseNotGiven => QuestionKind::TrueFalseNotGiven,
        QuestionType::YesNoNotGiven => QuestionKind::YesNoNotGiven,
        QuestionType::Matching => QuestionKind::Matching(matching_set(obj)),
        QuestionType::MatchingHeadings => QuestionKind::MatchingHeadings(matching_set(obj)),
        QuestionType::MatchingInformation => QuestionKind::MatchingInformation(matching_set(obj)),
        QuestionType::MatchingFeatures => QuestionKind::MatchingFeatures(matching_set(obj)),
        QuestionType::DiagramLabeling => QuestionKind::DiagramLabeling(diagram_set(obj)),
        QuestionType::MapDiagramLabeling => QuestionKind::MapDiagramLabeling(diagram_set(obj)),
        QuestionType::Completion => QuestionKind::Completion(completion_set(obj)),
    };

    Question {
        id,
        prompt,
        correct_answer,
        kind,
    }
}

fn matching_set(obj: &Map<String, Value>) -> MatchingSet {
    let defaults = MatchingSet::with_defaults();

    let mut option_ids = UniqueIds::default();
    let mut matching_options: Vec<MatchingOption> = match field(obj, "matchingOptions")
        .and_then(Value::as_array)
    {
        Some(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item = item.as_object();
                MatchingOption {
                    id: option_ids.assign(item.and_then(|o| field(o, "id")), lettered(i)),
                    label: item.map(|o| text(field(o, "label"), "")).unwrap_or_default(),
                }
            })
            .collect(),
        None => defaults
            .matching_options
            .into_iter()
            .map(|o| MatchingOption {
                id: option_ids.claim(o.id),
                ..o
            })
            .collect(),
    };
    while matching_options.len() < MIN_MATCHING_ENTRIES {
        let filler = default_matching_option(matching_options.len());
        matching_options.push(MatchingOption {
            id: option_ids.claim(filler.id),
            ..filler
        });
    }

    let mut item_ids = UniqueIds::default();
    let mut matching_items: Vec<MatchingItem> = match field(obj, "matchingItems")
        .and_then(Value::as_array)
    {
        Some(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item = item.as_object();
                let match_id = item
                    .and_then(|o| field(o, "matchId"))
                    .and_then(|m| non_blank(Some(m)))
                    .filter(|m| option_ids.contains(m));
                MatchingItem {
                    id: item_ids.assign(
                        item.and_then(|o| field(o, "id")),
                        format!("item-{}", i + 1),
                    ),
                    statement: item.map(|o| text(field(o, "statement"), "")).unwrap_or_default(),
                    match_id,
                }
            })
            .collect(),
        None => defaults
            .matching_items
            .into_iter()
            .map(|m| MatchingItem {
                id: item_ids.claim(m.id),
                ..m
            })
            .collect(),
    };
    while matching_items.len() < MIN_MATCHING_ENTRIES {
        let filler = default_matching_item(matching_items.len());
        matching_items.push(MatchingItem {
            id: item_ids.claim(filler.id),
            ..filler
        });
    }

    MatchingSet {
        matching_items,
        matching_options,
    }
}

fn diagram_set(obj: &Map<String, Value>) -> DiagramSet {
    let defaults = DiagramSet::with_defaults();

    let diagram_image_ids = match field(obj, "diagramImageIds").and_then(Value::as_array) {
        Some(ids) => ids.iter().filter_map(|id| non_blank(Some(id))).collect(),
        None => defaults.diagram_image_ids,
    };

    let mut label_ids = UniqueIds::default();
    let mut diagram_labels: Vec<DiagramLabel> = match field(obj, "diagramLabels")
        .and_then(Value::as_array)
    {
        Some(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let template = default_diagram_label(i);
                let Some(o) = item.as_object() else {
                    return DiagramLabel {
                        id: label_ids.claim(template.id.clone()),
                        ..template
                    };
                };
                DiagramLabel {
                    id: label_ids.assign(field(o, "id"), template.id.clone()),
                    letter: non_blank(field(o, "letter")).unwrap_or(template.letter),
                    position: position(field(o, "position"), template.position),
                    answer: text(field(o, "answer"), ""),
                }
            })
            .collect(),
        None => defaults
            .diagram_labels
            .into_iter()
            .map(|l| DiagramLabel {
                id: label_ids.claim(l.id.clone()),
                ..l
            })
            .collect(),
    };
    while diagram_labels.len() < MIN_DIAGRAM_LABELS {
        let filler = default_diagram_label(diagram_labels.len());
        diagram_labels.push(DiagramLabel {
            id: label_ids.claim(filler.id.clone()),
            ..filler
        });
    }

    DiagramSet {
        diagram_image_ids,
        diagram_labels,
    }
}

fn completion_set(obj: &Map<String, Value>) -> CompletionSet {
    let format = field(obj, "format")
        .and_then(Value::as_str)
        .and_then(|f| f.parse::<CompletionFormat>().ok())
        .unwrap_or_default();
    CompletionSet {
        format,
        options: padded_strings(
            field(obj, "options"),
            format.min_options(),
            format.default_options(),
        ),
    }
}

fn position(raw: Option<&Value>, defaults: LabelPosition) -> LabelPosition {
    let Some(obj) = raw.and_then(Value::as_object) else {
        return defaults;
    };
    LabelPosition {
        x: percentage(field(obj, "x"), defaults.x),
        y: percentage(field(obj, "y"), defaults.y),
    }
}

//=========================================================================================
// Writing & Speaking
//=========================================================================================

fn writing_body(obj: &Map<String, Value>) -> WritingBody {
    let task1 = match field(obj, "task1").and_then(Value::as_object) {
        Some(task) => WritingTask1 {
            task: writing_task(task),
            image_file_id: non_blank(field(task, "imageFileId")),
            visual_type: non_blank(field(task, "visualType")),
        },
        None => WritingTask1::default(),
    };
    let task2 = field(obj, "task2")
        .and_then(Value::as_object)
        .map(writing_task)
        .unwrap_or_default();
    WritingBody { task1, task2 }
}

fn writing_task(obj: &Map<String, Value>) -> WritingTask {
    WritingTask {
        prompt: text(field(obj, "prompt"), ""),
        rubric_id: non_blank(field(obj, "rubricId")),
        sample_response: non_blank(field(obj, "sampleResponse")),
        show_sample_to_students: flag(field(obj, "showSampleToStudents"), false),
        show_sample_timing: non_blank(field(obj, "showSampleTiming")),
        show_sample_date: non_blank(field(obj, "showSampleDate")),
    }
}

fn speaking_body(obj: &Map<String, Value>) -> SpeakingBody {
    let defaults = CueCardPart::default();
    let part2 = match field(obj, "part2").and_then(Value::as_object) {
        Some(part) => {
            let cue_card = match field(part, "cueCard").and_then(Value::as_object) {
                Some(card) => CueCard {
                    topic: text(field(card, "topic"), &defaults.cue_card.topic),
                    bullet_points: strings(field(card, "bulletPoints"))
                        .unwrap_or_else(|| defaults.cue_card.bullet_points.clone()),
                },
                None => defaults.cue_card.clone(),
            };
            CueCardPart {
                cue_card,
                prep_seconds: positive_int(field(part, "prepSeconds"), defaults.prep_seconds),
                talk_seconds: positive_int(field(part, "talkSeconds"), defaults.talk_seconds),
            }
        }
        None => defaults,
    };
    SpeakingBody {
        part1: speaking_questions(field(obj, "part1")),
        part2,
        part3: speaking_questions(field(obj, "part3")),
    }
}

/// Older configs stored a speaking part as a bare question array.
fn speaking_questions(raw: Option<&Value>) -> SpeakingQuestions {
    let list = match raw {
        Some(Value::Array(_)) => strings(raw),
        Some(Value::Object(obj)) => strings(field(obj, "questions")),
        _ => None,
    };
    match list {
        Some(questions) if !questions.is_empty() => SpeakingQuestions { questions },
        _ => SpeakingQuestions::placeholder(),
    }
}

//=========================================================================================
// Coercion Helpers
//=========================================================================================

/// Looks `key` up as written, then in its snake_case spelling.
fn field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).or_else(|| {
        let snake = to_snake_case(key);
        if snake == key {
            None
        } else {
            obj.get(&snake)
        }
    })
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Strings pass through, numbers are stringified, anything else is `default`.
fn text(raw: Option<&Value>, default: &str) -> String {
    match raw {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// A non-blank string, or `None`.
fn non_blank(raw: Option<&Value>) -> Option<String> {
    match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn flag(raw: Option<&Value>, default: bool) -> bool {
    match raw {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => match s.trim() {
            "true" => true,
            "false" => false,
            _ => default,
        },
        _ => default,
    }
}

fn parse_number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

/// Integers of at least one; fractional values are truncated.
fn parse_positive(raw: &Value) -> Option<u32> {
    parse_number(raw)
        .map(f64::trunc)
        .filter(|n| *n >= 1.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
}

fn positive_int(raw: Option<&Value>, default: u32) -> u32 {
    raw.and_then(parse_positive).unwrap_or(default)
}

fn percentage(raw: Option<&Value>, default: f64) -> f64 {
    raw.and_then(parse_number)
        .map(|n| n.clamp(0.0, 100.0))
        .unwrap_or(default)
}

/// An array coerced element-wise to strings; non-strings become blanks.
fn strings(raw: Option<&Value>) -> Option<Vec<String>> {
    raw.and_then(Value::as_array)
        .map(|items| items.iter().map(|item| text(Some(item), "")).collect())
}

/// A string list padded with blanks to `min`; `default_len` blanks when absent.
/// An empty list is treated like a missing one and gets `default_len` blanks.
fn padded_strings(raw: Option<&Value>, min: usize, default_len: usize) -> Vec<String> {
    let mut list = strings(raw)
        .filter(|list| !list.is_empty())
        .unwrap_or_else(|| vec![String::new(); default_len]);
    if list.len() < min {
        list.resize(min, String::new());
    }
    list
}

/// Maps a raw array through `reconcile`; a missing, wrong-typed or empty
/// array yields the single template element instead.
fn non_empty_elements<T>(
    raw: Option<&Value>,
    template: impl Fn(usize) -> T,
    mut reconcile: impl FnMut(usize, &Map<String, Value>) -> T,
) -> Vec<T> {
    let empty = Map::new();
    match raw.and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items
            .iter()
            .enumerate()
            .map(|(i, item)| reconcile(i, item.as_object().unwrap_or(&empty)))
            .collect(),
        _ => vec![template(0)],
    }
}

/// Hands out ids that are non-blank and unique within one scope.
#[derive(Default)]
struct UniqueIds {
    taken: HashSet<String>,
}

impl UniqueIds {
    /// Keeps the raw id when usable, otherwise derives one from `positional`.
    fn assign(&mut self, raw: Option<&Value>, positional: String) -> String {
        if let Some(id) = non_blank(raw) {
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
        self.claim(positional)
    }

    fn claim(&mut self, positional: String) -> String {
        let mut candidate = positional.clone();
        let mut suffix = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{positional}-{suffix}");
            suffix += 1;
        }
        candidate
    }

    fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }
}
