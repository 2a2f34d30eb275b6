pub mod breakdown;
pub mod scene;

pub use breakdown::*;
pub use scene::*;
