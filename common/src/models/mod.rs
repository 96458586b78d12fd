pub mod envelope;
pub mod history;

pub use envelope::*;
pub use history::*;
