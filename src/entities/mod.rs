pub mod prelude;

pub mod applications;
pub mod bookmarks;
pub mod companies;
pub mod jobs;
