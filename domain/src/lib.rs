pub mod errors;
pub mod models;
pub mod options;
pub mod persona;
pub mod ports;
pub mod prompts;
pub mod session;
