pub mod app;
pub mod crypto;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::QueryService;
pub use domain::label::LabelResolver;
pub use domain::localize::LocalizationEngine;
pub use domain::narration::NarrationEngine;
pub use error::{Error, Result};
pub use infra::classifier::ClassifierGateway;
pub use infra::config::Config;
pub use storage::FactStore;
