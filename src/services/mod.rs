pub mod extractor;
pub mod formatter;
pub mod github_sync;
pub mod notifier;
pub mod observer;
pub mod settings;

pub use extractor::SolutionExtractor;
pub use formatter::{format_submission, CommitMessage, FormattedSolution};
pub use github_sync::{GitHubClient, RemoteFile, UpsertOutcome};
pub use notifier::{Notifier, PageNotifier, Severity};
pub use observer::{AcceptanceEvent, ObserverConfig, SignalSource, SubmissionObserver, WatchOutcome};
pub use settings::{FileSettings, SettingsSource, StaticSettings, SyncSettings, SyncTarget};
