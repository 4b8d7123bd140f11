// src/handlers/mod.rs

pub mod ai;
pub mod auth;
pub mod quizzes;
pub mod results;
pub mod users;
