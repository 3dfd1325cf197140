pub mod classifier_client;

pub use classifier_client::{parse_prediction, Classifier, HttpClassifier, UPLOAD_FIELD};
