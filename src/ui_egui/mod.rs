mod app;
mod grid_mount;
pub mod views;

pub use app::CalendarApp;
