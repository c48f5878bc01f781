pub mod config;
pub mod logging;

pub mod dataset;
pub mod ensemble;
pub mod features;
pub mod label;
