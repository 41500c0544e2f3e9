mod repository;

pub use repository::SqliteTeamRepository;
