use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grade outside the 0-5 scale.
#[derive(Error, Debug, PartialEq, Eq)]
#[error("invalid review quality {0}, expected 0-5")]
pub struct InvalidQuality(pub i32);

/// Self-reported recall quality on the classic SM-2 0-5 scale.
///
/// Grades below `Difficult` (3) count as failed recall and reset the
/// card's repetition ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum ReviewQuality {
    /// Complete blackout.
    Blackout = 0,
    /// Wrong, but the answer felt familiar once seen.
    Incorrect = 1,
    /// Wrong, but the answer was easy to recall once seen.
    IncorrectEasy = 2,
    /// Correct with serious difficulty.
    Difficult = 3,
    /// Correct after some hesitation.
    Hesitant = 4,
    /// Perfect recall.
    Perfect = 5,
}

impl ReviewQuality {
    pub const PASSING: i32 = 3;

    pub fn grade(self) -> i32 {
        self as i32
    }

    /// Quality 3 is the lowest passing grade; the boundary is inclusive.
    pub fn is_passing(self) -> bool {
        self.grade() >= Self::PASSING
    }
}

impl TryFrom<i32> for ReviewQuality {
    type Error = InvalidQuality;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ReviewQuality::Blackout),
            1 => Ok(ReviewQuality::Incorrect),
            2 => Ok(ReviewQuality::IncorrectEasy),
            3 => Ok(ReviewQuality::Difficult),
            4 => Ok(ReviewQuality::Hesitant),
            5 => Ok(ReviewQuality::Perfect),
            other => Err(InvalidQuality(other)),
        }
    }
}

impl From<ReviewQuality> for i32 {
    fn from(quality: ReviewQuality) -> i32 {
        quality.grade()
    }
}
