// src/models/mod.rs

pub mod answer;
pub mod participant;
pub mod question;
pub mod quiz;
pub mod result;
pub mod submission;
pub mod user;
