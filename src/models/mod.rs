pub mod chat;
pub mod participant;
