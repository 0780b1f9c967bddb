pub mod classes;
pub mod documents;
pub mod permissions;
pub mod users;
