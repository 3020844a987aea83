//! Interfaces between QAS and other software.

pub mod input;
