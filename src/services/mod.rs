pub mod analysis;

pub use analysis::{AnalysisService, RefreshOutcome, ServiceSettings, SnapshotOrigin};
