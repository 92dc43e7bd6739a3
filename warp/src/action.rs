pub(crate) mod switch_source;
pub(crate) mod complete;
pub(crate) mod reorder;
pub(crate) mod rename;
