//! Resource Loader Adapters

mod http_resource_loader;

pub use http_resource_loader::HttpResourceLoader;
