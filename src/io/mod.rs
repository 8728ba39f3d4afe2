pub mod input;

pub use input::{InputError, InputSource};
