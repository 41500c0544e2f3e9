mod repository;

pub use repository::SqliteUserRepository;
