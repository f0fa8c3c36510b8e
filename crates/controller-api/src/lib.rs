pub mod app;
pub mod error;
pub mod handlers;
pub mod state;

#[cfg(test)]
pub mod test_support;

pub use app::build_app;
pub use state::AppState;
