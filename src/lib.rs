pub mod app_logger;
pub mod auth;
pub mod browser;
pub mod config;
pub mod cover_letter;
pub mod delay_manager;
pub mod listings;
pub mod logger;
pub mod resume_loader;
pub mod search;
pub mod selectors;

// Exporting types for convenience
pub use browser::{Browser, BrowserError, By};
pub use config::{AppConfig, Credentials, JobPreferences};
pub use cover_letter::CoverLetterGenerator;
pub use listings::{JobListing, RunSummary};
