pub mod classifier;
pub mod config;
pub mod error;
pub mod logger;
pub mod output;
pub mod protocol;
pub mod session;
pub mod transport;

// Re-exports for convenience
pub use classifier::{classify, Classification, ClassifierMode, MessageClassifier};
pub use config::Config;
pub use error::{ItineraError, Result};
pub use protocol::OutputFormat;
pub use session::{Session, SessionController, SessionEvent, SessionState};
