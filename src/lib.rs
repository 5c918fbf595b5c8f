//! Four-pillar (八字) chart calculation, elemental profiling and the
//! parenting report built on top of them.

pub mod advice;
pub mod careability;
pub mod config;
pub mod cycle;
pub mod error;
pub mod llm;
pub mod pillar;
pub mod report;
pub mod scoring;
pub mod storage;
