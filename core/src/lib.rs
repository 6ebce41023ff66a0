pub mod assessment;
pub mod capture;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod narrative;
pub mod peer_review;
pub mod proof;
pub mod qa;
pub mod report;
pub mod scoring;
pub mod staff;
pub mod store;
pub mod tally;
pub mod types;
pub mod workload;
