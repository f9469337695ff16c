pub mod errors;
pub mod observation;

pub use errors::*;
pub use observation::*;
