pub mod access;
pub mod aggregate;
pub mod entry;
pub mod history;
