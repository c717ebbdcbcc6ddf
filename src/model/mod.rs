pub mod data_core;
pub mod graph;
pub mod parser;
pub mod performance;
pub mod search;
