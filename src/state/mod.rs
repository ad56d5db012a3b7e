pub mod machine;
pub mod model;

pub use machine::SchemeStateMachine;
pub use model::{tie_break, Resolution, SchemePair};
