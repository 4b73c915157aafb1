pub mod auth;
pub mod error;
pub mod export;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod usecase;

pub use auth::{Capabilities, IdentityProvider, Role, Session};
pub use error::{AuthError, ValidationError};
pub use input::{draft_from_fields, expand_key, normalize_fields, parse_entry_args, ParsedEntry};
pub use model::{Ledger, LotKey, Period, ReadingDraft, ReadingRecord};
pub use repository::{FileIdentityProvider, FileLotRepository, LotRepository, UserAccount};
pub use service::dto::{DashboardData, EntrySuggestion, LotReading};
pub use service::ledger_service::{next_entry_suggestion, validate_and_build, LedgerService};
pub use usecase::analysis::{chronological, consumption_trend, ConsumptionTrend};
pub use usecase::dashboard::{compute_dashboard, DashboardUseCase};
