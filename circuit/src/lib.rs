pub mod errors;
pub mod gate;
pub mod load;

pub use errors::*;
pub use gate::*;
