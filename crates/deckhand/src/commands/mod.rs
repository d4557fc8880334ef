pub mod completion;
pub mod config;
pub mod notes;
pub mod state;
pub mod version;
