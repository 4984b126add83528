//! HTTP Routes

pub mod health;
pub mod predict;
pub mod prometheus;
pub mod root;
