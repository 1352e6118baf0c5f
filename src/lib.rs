pub mod app;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod ui;
pub mod views;
