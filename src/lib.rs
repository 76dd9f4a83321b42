pub mod app;
pub mod assistant;
pub mod document;
pub mod pdf;
pub mod render;
pub mod session;
pub mod settings;
