//! Crate for reading, writing and transforming multi-namespace mapping trees.
//!
//! The central type is [`tree::mappings::MappingTree`], an in-memory symbol table that maps
//! classes, fields and methods across any number of named namespaces. Trees are read and
//! written in the Tiny v2 (`.tiny`) format, see the [`tiny_v2`] module, and can also be
//! built from ProGuard obfuscation maps, see the [`proguard`] module.
//!
//! The namespace transforms (source switch, completion, destination reorder, rename) live
//! as methods on the tree itself; see the docs on [`tree::mappings::MappingTree`].

mod lines;
mod action;

pub mod tiny_v2;
pub mod proguard;

pub mod tree;

pub mod remapper;
