pub mod credentials;
pub mod factory;
pub mod infrastructure;
pub mod registry;
pub mod traits;

pub use credentials::{CredentialStore, InMemoryCredentialStore, TrackingService};
pub use factory::registry_from_config;
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
pub use traits::{
    search_type_for, ContentFetcher, DetailsOptions, MediaSearcher, ProviderClient,
    RateLimiterInfo,
};
