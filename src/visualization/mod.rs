pub mod palette;
pub mod replay;
pub mod plots;
pub mod frames;
pub mod animation;
