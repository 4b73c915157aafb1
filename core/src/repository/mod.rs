pub mod file;
pub mod identity;
pub mod traits;

// Re-export
pub use file::FileLotRepository;
pub use identity::{FileIdentityProvider, UserAccount};
pub use traits::LotRepository;
