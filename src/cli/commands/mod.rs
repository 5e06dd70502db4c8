mod import;
mod list;
mod search;

pub use import::cmd_import;
pub use list::cmd_list_jobs;
pub use search::{SearchArgs, cmd_search_jobs};
