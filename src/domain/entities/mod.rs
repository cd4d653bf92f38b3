pub mod criteria;
pub mod edit;
pub mod filter_model;
pub mod grid_state;
pub mod row;
pub mod sort_model;
