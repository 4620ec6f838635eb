pub mod backend;
pub mod config;
pub mod controller;
pub mod error;
pub mod image;
pub mod logger;
pub mod prompt;
pub mod session;
pub mod shell;
pub mod slicefile;
pub mod sync;
pub mod topology;

pub use error::SlicerError;

pub type Result<T> = std::result::Result<T, SlicerError>;

pub use backend::{HttpBackend, SliceBackend, SlicePayload};
pub use controller::Controller;
pub use image::{Image, ImageCatalog};
pub use session::Session;
pub use topology::{Link, Topology, VmNode};
