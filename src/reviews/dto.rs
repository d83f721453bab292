use serde::Serialize;

use crate::reviews::aggregate::ReviewSummary;
use crate::reviews::services::Outcome;

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ReviewSummaryResponse {
    Pending,
    Ready {
        doctor_uid: String,
        #[serde(flatten)]
        summary: ReviewSummary,
    },
}

impl ReviewSummaryResponse {
    pub fn new(doctor_uid: String, outcome: Outcome<ReviewSummary>) -> Self {
        match outcome {
            Outcome::Pending => Self::Pending,
            Outcome::Ready(summary) => Self::Ready {
                doctor_uid,
                summary,
            },
        }
    }
}
