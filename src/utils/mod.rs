pub mod http;
pub mod ini;
pub mod string;

// Re-export common utilities
pub use http::{fetch_subscription, FetchError, FetchedSubscription};
pub use ini::{IniEntries, IniSections};
