pub mod category;
pub mod descriptor;
pub mod file_record;

pub use category::*;
pub use descriptor::*;
pub use file_record::*;
