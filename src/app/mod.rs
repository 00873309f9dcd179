pub mod login;
pub mod terminal;
