pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod ws;

pub use routes::router;
pub use state::AppState;
