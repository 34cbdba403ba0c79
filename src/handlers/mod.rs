// src/handlers/mod.rs

pub mod admin;
pub mod dashboard;
pub mod students;
pub mod submissions;
