//! Risk flow step state machine.
//!
//! Defines where the user is in the category → event → description →
//! questionnaire flow, and the lock predicates derived from it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{StateMachine, ValidationError};

/// 1-based position of a question in the assessment questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionNumber(u8);

impl QuestionNumber {
    pub const FIRST: QuestionNumber = QuestionNumber(1);

    /// Creates a question number, rejecting zero and values above 255.
    pub fn new(number: usize) -> Result<Self, ValidationError> {
        if number == 0 || number > u8::MAX as usize {
            return Err(ValidationError::out_of_range(
                "question_number",
                1,
                u8::MAX as i32,
                number.min(i32::MAX as usize) as i32,
            ));
        }
        Ok(Self(number as u8))
    }

    /// The 1-based number.
    pub fn get(self) -> usize {
        self.0 as usize
    }

    /// Position in the loaded field list.
    pub fn index(self) -> usize {
        self.get() - 1
    }

    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn previous(self) -> Option<Self> {
        (self.0 > 1).then(|| Self(self.0 - 1))
    }
}

impl fmt::Display for QuestionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the risk flow currently stands.
///
/// Exactly one step is active at a time; the chat store holds it and the
/// presentation layer picks the screen to render from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum FlowStep {
    /// No assessment running.
    #[default]
    Idle,

    /// Category cards shown, waiting for a pick.
    WaitingCategory,

    /// Event list of the chosen category shown.
    WaitingEvent,

    /// Event description shown, waiting for the go-ahead.
    WaitingChoice,

    /// Questionnaire running at the given question.
    Assessment { question: QuestionNumber },

    /// Every question answered, outcome shown.
    AssessmentComplete,

    /// Report finalized.
    Completed,
}

/// Lock flags derived from the step, consumed by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LockState {
    /// A selection is underway; switching needs explicit confirmation.
    pub process_locked: bool,
    /// Past the point of no return; only a full reset moves the flow.
    pub hard_locked: bool,
}

/// First question number that is hard-locked for a questionnaire of
/// `total_questions` questions.
pub fn hard_lock_threshold(total_questions: usize) -> usize {
    total_questions.saturating_sub(1).max(1)
}

impl FlowStep {
    /// Builds the assessment step for a question number.
    pub fn question(number: QuestionNumber) -> Self {
        FlowStep::Assessment { question: number }
    }

    /// Question number when the questionnaire is running.
    pub fn current_question(&self) -> Option<QuestionNumber> {
        match self {
            FlowStep::Assessment { question } => Some(*question),
            _ => None,
        }
    }

    pub fn is_assessment(&self) -> bool {
        matches!(self, FlowStep::Assessment { .. })
    }

    /// True once a category/event selection is underway.
    pub fn is_process_locked(&self) -> bool {
        !matches!(self, FlowStep::Idle | FlowStep::WaitingCategory)
    }

    /// True from the second-to-last question onward.
    pub fn is_hard_locked(&self, total_questions: usize) -> bool {
        match self {
            FlowStep::AssessmentComplete | FlowStep::Completed => true,
            FlowStep::Assessment { question } => {
                question.get() >= hard_lock_threshold(total_questions)
            }
            _ => false,
        }
    }

    pub fn lock_state(&self, total_questions: usize) -> LockState {
        LockState {
            process_locked: self.is_process_locked(),
            hard_locked: self.is_hard_locked(total_questions),
        }
    }

    /// Back navigation is only offered inside the questionnaire, past the
    /// first question, and never once hard-locked.
    pub fn can_go_back(&self, total_questions: usize) -> bool {
        match self {
            FlowStep::Assessment { question } => {
                question.get() > 1 && !self.is_hard_locked(total_questions)
            }
            _ => false,
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowStep::Idle => write!(f, "idle"),
            FlowStep::WaitingCategory => write!(f, "waiting_category"),
            FlowStep::WaitingEvent => write!(f, "waiting_event"),
            FlowStep::WaitingChoice => write!(f, "waiting_choice"),
            FlowStep::Assessment { question } => write!(f, "assessment_q{}", question),
            FlowStep::AssessmentComplete => write!(f, "assessment_complete"),
            FlowStep::Completed => write!(f, "completed"),
        }
    }
}

// Reset to Idle is not an edge of this machine: it overwrites the step
// unconditionally and is the only way out of a hard lock.
impl StateMachine for FlowStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use FlowStep::*;
        match (self, target) {
            (Idle, WaitingCategory) => true,
            (WaitingCategory, WaitingEvent) => true,
            // category re-pick or swap
            (WaitingEvent, WaitingCategory) | (WaitingEvent, WaitingEvent) => true,
            (WaitingEvent, WaitingChoice) => true,
            (WaitingChoice, WaitingEvent) | (WaitingChoice, WaitingChoice) => true,
            (WaitingChoice, Assessment { question }) => *question == QuestionNumber::FIRST,
            (Assessment { question: from }, Assessment { question: to }) => {
                to.get() == from.get() + 1 || to.get() + 1 == from.get()
            }
            (Assessment { .. }, AssessmentComplete) => true,
            // clean restart, category override, in-place event reload
            (Assessment { .. }, WaitingEvent) | (Assessment { .. }, WaitingChoice) => true,
            (AssessmentComplete, Completed) => true,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use FlowStep::*;
        match self {
            Idle => vec![WaitingCategory],
            WaitingCategory => vec![WaitingEvent],
            WaitingEvent => vec![WaitingCategory, WaitingEvent, WaitingChoice],
            WaitingChoice => vec![WaitingEvent, WaitingChoice, Assessment { question: QuestionNumber::FIRST }],
            Assessment { question } => {
                let mut targets = vec![Assessment { question: question.next() }];
                if let Some(previous) = question.previous() {
                    targets.push(Assessment { question: previous });
                }
                targets.extend([AssessmentComplete, WaitingEvent, WaitingChoice]);
                targets
            }
            AssessmentComplete => vec![Completed],
            Completed => vec![],
        }
    }
}
