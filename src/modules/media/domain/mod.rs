pub mod entities;
pub mod value_objects;

pub use entities::{
    ChapterEntity, CharacterEntity, EpisodeEntity, MediaDetailsEntity, MediaEntity, ReviewEntity,
    StaffEntity,
};
pub use value_objects::{MediaStatus, PageProvider, PageResult, SearchPage};
