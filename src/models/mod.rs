// src/models/mod.rs

pub mod genre;
pub mod question;
pub mod question_stat;
pub mod quiz;
pub mod ranking;
pub mod user;
