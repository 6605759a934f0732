mod map;
mod value;
mod vec;

pub use map::StateMap;
pub use value::StateValue;
pub use vec::{StateVec, StateVecError};
