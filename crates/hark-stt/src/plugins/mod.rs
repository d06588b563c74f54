//! Bundled plugin implementations

pub mod mock;

pub use mock::{MockDecoder, MockPlugin, MockPluginFactory};
