mod chapter;
mod episode;
mod media;
mod media_details;

pub use chapter::ChapterEntity;
pub use episode::EpisodeEntity;
pub use media::MediaEntity;
pub use media_details::{CharacterEntity, MediaDetailsEntity, ReviewEntity, StaffEntity};
