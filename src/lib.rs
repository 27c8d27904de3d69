pub mod app;
pub mod cache;
pub mod config;
pub mod data;
pub mod favorites;
pub mod logging;
pub mod model;
pub mod render;
pub mod retry;
pub mod roster;
pub mod storage;
pub mod tasks;
pub mod theme;
pub mod ui;
