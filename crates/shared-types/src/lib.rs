pub mod document;
pub mod envelope;
pub mod report;

pub use document::{join_readable_text, AcceptedFileType, Document, DocumentStatus};
pub use envelope::Envelope;
pub use report::{
    CategoryScores, OwnershipEvent, RiskBand, RiskFactor, RiskSeverity, RiskType, Score,
    VerificationResult,
};
