pub mod chapter;
pub use chapter::*;

pub mod chapter_info;
pub use chapter_info::*;

pub mod language;
pub use language::*;
