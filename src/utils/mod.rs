// src/utils/mod.rs

pub mod refresh;
