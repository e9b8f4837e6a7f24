mod tests;

pub mod base;
pub mod blend;
pub mod catalog;
pub mod feed;
pub mod heap;
pub mod selector;
