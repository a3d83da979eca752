pub mod config;
pub mod filter;
pub mod playlist;
pub mod report;
pub mod storage;
pub mod transcript;

pub use config::*;
pub use filter::*;
pub use playlist::*;
pub use report::*;
pub use storage::*;
pub use transcript::*;
