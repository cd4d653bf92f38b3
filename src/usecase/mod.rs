pub mod criteria;
pub mod ports;
pub mod services;
