pub mod board;
pub mod config;
pub mod format;
pub mod input;
pub mod market;
pub mod session;
pub mod view;
