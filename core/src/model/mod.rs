pub mod lot;
pub mod period;
pub mod record;

// Re-export
pub use lot::{Ledger, LotKey};
pub use period::Period;
pub use record::{ReadingDraft, ReadingRecord};
