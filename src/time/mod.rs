mod date;
pub use date::*;
