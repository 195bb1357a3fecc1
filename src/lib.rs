pub mod config;
pub mod diff;
pub mod fetch;
pub mod github;
pub mod model;
pub mod notify;
pub mod retry;
