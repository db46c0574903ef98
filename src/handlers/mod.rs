pub mod collection;
pub mod diagnostics;
