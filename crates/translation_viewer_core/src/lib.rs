pub mod domain;
pub mod error;
pub mod jobs;
pub mod navigation;
pub mod pipeline;
pub mod ports;
pub mod session;

pub use domain::{DocumentSource, NavigationState, SourceKind, TranslationRequest, TranslationStatus};
pub use error::ViewerError;
pub use jobs::{Completion, Job};
pub use navigation::{NavigationController, PageMove};
pub use pipeline::{TranslationCompletion, TranslationPipeline, TranslationTicket};
pub use ports::{DocumentAdapter, PdfDocument, PortError, PortResult, TranslationProvider};
pub use session::{ViewerSession, ViewerSnapshot};
