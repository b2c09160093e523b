pub mod facing;
pub mod input;
pub mod time;
