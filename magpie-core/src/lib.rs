pub mod config;
pub mod error;
pub mod join;
pub mod project;
pub mod source;
pub mod types;

pub use config::AppConfig;
pub use error::*;
pub use join::join_records;
pub use project::Projection;
pub use source::DataSource;
pub use types::*;
