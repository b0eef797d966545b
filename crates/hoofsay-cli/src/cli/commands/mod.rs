pub mod ponies;
pub mod say;
pub mod styles;
