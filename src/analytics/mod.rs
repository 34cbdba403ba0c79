// src/analytics/mod.rs
//
// Submission analytics and ranking. Everything in here is a pure function of
// already-fetched data: no I/O, no errors, zero-valued results for empty input.

pub mod best_attempt;
pub mod cohort;
pub mod export;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
