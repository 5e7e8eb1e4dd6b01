pub mod combat;
pub mod dice;
pub mod errors;
pub mod services;
pub mod utils;
