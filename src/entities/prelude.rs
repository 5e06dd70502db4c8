pub use super::applications::Entity as Applications;
pub use super::bookmarks::Entity as Bookmarks;
pub use super::companies::Entity as Companies;
pub use super::jobs::Entity as Jobs;
