pub mod page_request;

pub use page_request::{PageRequest, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
