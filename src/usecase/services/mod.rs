pub mod edit_service;
pub mod export_service;
pub mod grid_coordinator;
pub mod query_service;
