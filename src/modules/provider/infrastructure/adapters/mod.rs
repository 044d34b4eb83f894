pub mod anilist;
pub mod jikan;
pub mod kitsu;
pub mod mapper;
pub mod simkl;
pub mod tmdb;

pub use anilist::AniListAdapter;
pub use jikan::JikanAdapter;
pub use kitsu::KitsuAdapter;
pub use simkl::SimklAdapter;
pub use tmdb::TmdbAdapter;
