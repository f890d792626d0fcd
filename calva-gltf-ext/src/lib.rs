#![warn(clippy::all)]

//! Typed `KHR_*` glTF extensions with a name-keyed (de)serializer registry.
//!
//! ```no_run
//! use calva_gltf_ext::{json::Document, Config};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let doc = Document::read(&std::fs::read_to_string("scene.gltf")?, &config)?;
//! println!("{}", doc.write(&config)?);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
pub mod extensions;
mod indexed;
pub mod json;
mod registry;

pub use config::{Config, UnknownExtensionPolicy};
pub use error::{Error, Result};
pub use indexed::{Identified, IndexedContainer};
pub use registry::{
    khr_deserializer, khr_serializer, DeserializeFn, ExtensionDeserializer, ExtensionSerializer,
    SerializeFn,
};
