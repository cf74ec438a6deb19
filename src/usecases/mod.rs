pub mod images;
pub mod messages;
