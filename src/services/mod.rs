// Service module exports

pub mod config;
pub mod feed;
pub mod layout;
pub mod navigation;
pub mod now_marker;
