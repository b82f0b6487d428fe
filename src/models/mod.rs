// src/models/mod.rs

pub mod blog;
pub mod contact;
pub mod course;
pub mod enrollment;
pub mod user;
