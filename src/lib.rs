pub mod concept;
pub mod config;
pub mod constellation;
pub mod error;
pub mod layout;
pub mod render;
pub mod scroll;

// Vector / easing / hashing helpers
pub mod fast_math;
