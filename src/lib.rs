pub mod api;
pub mod capture;
pub mod config;
pub mod forward;
pub mod humanize;
pub mod integrations;
pub mod ledger;
pub mod observability;
pub mod storage;
