pub mod app_state;
pub mod filter_inputs;
pub mod pager;
