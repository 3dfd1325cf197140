pub mod handoff;
pub mod submission;

pub use handoff::ResultHandoff;
pub use submission::{
    SubmissionController, SubmissionPhase, SubmissionState, ANALYSIS_FLOOR, FLOOR_MS,
};
