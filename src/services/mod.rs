// src/services/mod.rs

pub mod aggregation;
pub mod finalize;
pub mod generation;
pub mod grading;
pub mod llm;
pub mod scoring;
pub mod store;
