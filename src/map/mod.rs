//! This module contains the maze layout, its parser and the static collision source built from it.

pub mod builder;
pub mod parser;
