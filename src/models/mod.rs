// src/models/mod.rs

pub mod dashboard;
pub mod problem;
pub mod student;
pub mod submission;
