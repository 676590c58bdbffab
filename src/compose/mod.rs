//! Transition compositor: places validated scenes on the output timeline and turns the extracted
//! segments into one continuous picture and sound track.

pub mod audio;
pub mod timeline;
pub mod video;
