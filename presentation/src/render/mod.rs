//! Live rendering of the conversation as it changes

pub mod terminal;
