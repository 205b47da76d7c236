// src/models/mod.rs

pub mod answer;
pub mod metrics;
pub mod question;
pub mod quiz;
pub mod user;
