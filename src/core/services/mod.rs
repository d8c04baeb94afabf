pub mod notice_service;
pub mod summary_service;

pub use notice_service::{Notice, NoticeLevel, NoticeService, Operation};
pub use summary_service::{CategorySlice, Dashboard, FeedEntry, SummaryService};
