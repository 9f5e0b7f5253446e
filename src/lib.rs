pub mod arguments;
pub mod config;
pub mod corpus;
pub mod errors; // Structured error handling
pub mod logger;
pub mod search;
pub mod trader;
pub mod utils;
