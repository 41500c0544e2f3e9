//! User module
//!
//! Owns user accounts. Other modules see users only through [`UserLookup`].

mod api;
mod entity;
mod repository;
mod service;

pub use api::{CreateUserRequest, UpdateUserRequest, UserApi, UserLookup, UserResponse};
pub use entity::User;
pub use repository::UserRepository;
pub use service::UserService;
