mod create;
mod list;
mod record;

pub use create::create;
pub use list::{list_all, list_mine};
pub use record::{delete, update};
