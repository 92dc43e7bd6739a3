//! Construction of layered mapping bundles.
//!
//! A [`spec::LayeredMappingSpec`] names an ordered list of mapping layers. The
//! [`processor::LayeredMappingsProcessor`] resolves the spec against a
//! [`context::MappingContext`] (downloading what needs downloading), folds the resolved
//! layers into one named-keyed [`warp::tree::mappings::MappingTree`], and
//! [`bundle`] writes the distributable zip holding the tiny mappings plus any side
//! artifacts (record signature fixes, unpick data) the layers contributed.

pub mod layer;
pub mod spec;
pub mod processor;
pub mod context;
pub mod service;
pub mod bundle;
pub mod download;
