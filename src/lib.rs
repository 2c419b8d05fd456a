pub mod config;
pub mod error;
pub mod export;
pub mod gamelog_fetch;
pub mod http_client;
pub mod join;
pub mod odds_fetch;
pub mod pipeline;
pub mod rate_limit;
pub mod report;
pub mod scoring;
pub mod state;
