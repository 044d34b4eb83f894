mod media_type;
mod provider_id;

pub use media_type::MediaType;
pub use provider_id::ProviderId;
