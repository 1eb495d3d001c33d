pub mod analysis;
pub mod enums;
pub mod medicine;

pub use analysis::*;
pub use enums::*;
pub use medicine::*;
