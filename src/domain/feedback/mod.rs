//! Feedback survey domain.
//!
//! The survey asks for six 1-5 ratings and two optional free-text answers.
//! A draft is validated into a [`FeedbackSubmission`], the payload sent to
//! the backend.

use serde::Serialize;
use std::fmt;

use crate::domain::foundation::{SessionId, UserId, ValidationError};

/// Flag persisted once the user has given feedback.
pub const FEEDBACK_SUBMITTED_FLAG: &str = "feedback_submitted";

/// Rating on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SurveyRating(u8);

impl SurveyRating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn try_new(field: &str, value: u8) -> Result<Self, ValidationError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(ValidationError::out_of_range(
                field,
                Self::MIN as i32,
                Self::MAX as i32,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for SurveyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Survey as filled in by the user; ratings may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub impression_ui: Option<u8>,
    pub impression_utility: Option<u8>,
    pub ease_of_use: Option<u8>,
    pub innovation: Option<u8>,
    pub syd_helpfulness: Option<u8>,
    pub assessment_clarity: Option<u8>,
    pub liked_most: String,
    pub improvements: String,
}

impl FeedbackDraft {
    fn ratings(&self) -> [(&'static str, Option<u8>); 6] {
        [
            ("impressionUI", self.impression_ui),
            ("impressionUtility", self.impression_utility),
            ("easeOfUse", self.ease_of_use),
            ("innovation", self.innovation),
            ("sydHelpfulness", self.syd_helpfulness),
            ("assessmentClarity", self.assessment_clarity),
        ]
    }

    /// Wire names of the ratings still unanswered.
    pub fn missing_ratings(&self) -> Vec<&'static str> {
        self.ratings()
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Validates the draft into a submission for the given identity.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` on `ratings` listing every missing rating
    /// - `OutOfRange` for the first rating outside 1-5
    pub fn validate(
        &self,
        session_id: SessionId,
        user_id: Option<UserId>,
        user_email: Option<String>,
    ) -> Result<FeedbackSubmission, ValidationError> {
        let missing = self.missing_ratings();
        if !missing.is_empty() {
            return Err(ValidationError::invalid_format(
                "ratings",
                format!("missing {}", missing.join(", ")),
            ));
        }

        let mut ratings = Vec::with_capacity(6);
        for (name, value) in self.ratings() {
            ratings.push(SurveyRating::try_new(name, value.unwrap_or_default())?);
        }

        Ok(FeedbackSubmission {
            session_id: session_id.to_string(),
            user_id: user_id.map(|id| id.as_str().to_string()),
            user_email: user_email.filter(|e| !e.trim().is_empty()),
            impression_ui: ratings[0],
            impression_utility: ratings[1],
            ease_of_use: ratings[2],
            innovation: ratings[3],
            syd_helpfulness: ratings[4],
            assessment_clarity: ratings[5],
            liked_most: self.liked_most.trim().to_string(),
            improvements: self.improvements.trim().to_string(),
        })
    }
}

/// Validated survey payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    #[serde(rename = "impressionUI")]
    pub impression_ui: SurveyRating,
    pub impression_utility: SurveyRating,
    pub ease_of_use: SurveyRating,
    pub innovation: SurveyRating,
    pub syd_helpfulness: SurveyRating,
    pub assessment_clarity: SurveyRating,
    pub liked_most: String,
    pub improvements: String,
}

/// What the backend said about a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackReceipt {
    Accepted,
    /// The backend already had feedback for this user; treated as success.
    AlreadySubmitted { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_draft() -> FeedbackDraft {
        FeedbackDraft {
            impression_ui: Some(5),
            impression_utility: Some(4),
            ease_of_use: Some(4),
            innovation: Some(3),
            syd_helpfulness: Some(5),
            assessment_clarity: Some(2),
            liked_most: "  La chat ".to_string(),
            improvements: String::new(),
        }
    }

    mod rating {
        use super::*;

        #[test]
        fn accepts_one_to_five() {
            for v in 1..=5 {
                assert_eq!(SurveyRating::try_new("x", v).unwrap().value(), v);
            }
        }

        #[test]
        fn rejects_zero_and_six() {
            assert!(SurveyRating::try_new("x", 0).is_err());
            assert!(SurveyRating::try_new("x", 6).is_err());
        }
    }

    mod validate {
        use super::*;

        #[test]
        fn lists_every_missing_rating() {
            let draft = FeedbackDraft {
                impression_ui: Some(3),
                innovation: Some(4),
                ..Default::default()
            };
            assert_eq!(
                draft.missing_ratings(),
                vec!["impressionUtility", "easeOfUse", "sydHelpfulness", "assessmentClarity"]
            );
            let err = draft.validate(SessionId::new(), None, None).unwrap_err();
            assert!(err.to_string().contains("easeOfUse"));
        }

        #[test]
        fn out_of_range_rating_is_rejected() {
            let draft = FeedbackDraft {
                innovation: Some(9),
                ..complete_draft()
            };
            assert_eq!(
                draft.validate(SessionId::new(), None, None).unwrap_err(),
                ValidationError::out_of_range("innovation", 1, 5, 9)
            );
        }

        #[test]
        fn complete_draft_serializes_with_wire_names() {
            let submission = complete_draft()
                .validate(SessionId::new(), None, Some(" ".to_string()))
                .unwrap();
            assert_eq!(submission.liked_most, "La chat");
            assert_eq!(submission.user_email, None);

            let json = serde_json::to_value(&submission).unwrap();
            assert_eq!(json["impressionUI"], 5);
            assert_eq!(json["assessmentClarity"], 2);
            assert_eq!(json["likedMost"], "La chat");
            assert!(json.get("sessionId").is_some());
        }
    }
}
