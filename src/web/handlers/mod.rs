pub mod categories;
pub mod moderate;
