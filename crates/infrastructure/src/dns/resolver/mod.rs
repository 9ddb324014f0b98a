pub mod builder;
pub mod cache_layer;
pub mod config;

pub use builder::ResolverBuilder;
pub use cache_layer::CachingResolver;
pub use config::ResolverConfig;
