pub mod colors;
pub mod logging;
pub mod menu;
pub mod print;
