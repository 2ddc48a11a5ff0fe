mod column;
mod column_data;
mod guid;
mod type_info;

pub use column::*;
pub use column_data::*;
pub use guid::*;
pub use type_info::*;
