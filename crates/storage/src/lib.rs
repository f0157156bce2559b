//! Local directory trees: walking them and finding shoot folders inside them.
//!
//! Both source trees are organized by hand, differently on every machine, so
//! nothing here assumes a fixed depth. A shoot is found by its folder name
//! wherever it sits (see [`resolve_shoot_subtree`]), and [`enumerate_all`]
//! lists everything below it for progress accounting.

pub mod error;
mod path;
mod resolve;
mod walk;

pub use crate::path::{is_hidden, is_image, is_shoot_folder};
pub use crate::resolve::resolve_shoot_subtree;
pub use crate::walk::{check_directory, contains_image, enumerate_all};
