pub mod interpolate;
pub mod reduce;

pub use interpolate::*;
pub use reduce::*;
