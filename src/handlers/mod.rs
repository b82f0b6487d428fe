// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod course;
pub mod enroll;
pub mod quiz;
pub mod user;
