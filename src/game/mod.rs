pub mod collision;
pub mod constants;
pub mod engine;
pub mod grid;
pub mod session;
pub mod state;
pub mod types;
