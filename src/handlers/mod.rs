// src/handlers/mod.rs

pub mod answer;
pub mod auth;
pub mod metrics;
pub mod profile;
pub mod question;
pub mod quiz;
