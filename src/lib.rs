// Deckhand - AI assistant backend for trading card game research and shopping

pub mod agents;
pub mod config;
pub mod llm;
pub mod models;
pub mod params;
pub mod relay; // Event relay: agent output onto streaming HTTP responses
pub mod routes;
pub mod tools;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
// Note: Import specific items from types module instead of glob to avoid name conflicts
// e.g., use deckhand::types::{AppError, AppResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
