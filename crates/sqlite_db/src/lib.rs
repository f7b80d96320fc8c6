mod db;
mod error;
mod functions;

pub use db::*;
pub use error::Error;
pub use functions::register_functions;

pub type Result<T> = std::result::Result<T, Error>;
