pub mod analysis;
pub mod scan;
pub mod patient;

pub use analysis::{AnalysisResult, HeatmapImage, PredictResponse, TumorClass};
pub use scan::{ImageFile, ImageSelection, ImageUpload};
pub use patient::PatientRecord;
