pub mod language;
pub mod snapshot;
pub mod submission;

pub use language::{detect_from_code, normalize_language, LanguageInfo, DEFAULT_LANGUAGE};
pub use snapshot::{EditorModel, PageSnapshot};
pub use submission::{Difficulty, SubmissionRecord};
