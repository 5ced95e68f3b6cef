//! Moving matched files into rule destinations

pub mod io;
pub mod mover;

pub use io::{ensure_directory, relocate_file};
pub use mover::{move_batch, move_files, MoveReport};
