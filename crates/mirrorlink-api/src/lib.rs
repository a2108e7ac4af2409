pub mod error;
pub mod links;
pub mod middleware;
pub mod reconciler;
pub mod registry;
pub mod state;
