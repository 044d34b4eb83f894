pub mod domain;

// Re-export commonly used types
pub use domain::{
    ChapterEntity, CharacterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, MediaStatus,
    PageProvider, PageResult, ReviewEntity, SearchPage, StaffEntity,
};
