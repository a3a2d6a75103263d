// src/services/mod.rs

pub mod catalog;
pub mod ranking;
pub mod recommender;
pub mod scoring;
pub mod session;
