pub mod actors;
pub mod categories;
pub mod role_categories;
pub mod roles;
