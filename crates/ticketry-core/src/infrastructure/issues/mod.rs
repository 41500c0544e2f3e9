mod repository;

pub use repository::SqliteIssueRepository;
