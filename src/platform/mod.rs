pub mod debounce;
pub mod desktop;
