mod media_status;
mod page;

pub use media_status::MediaStatus;
pub use page::{PageProvider, PageResult, SearchPage};
