//! Users Domain
//!
//! User accounts for the blogging platform: registration, login, profile
//! lookup and self-service updates, plus resolution of the current caller
//! from the request principal.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  Services   │  ← UserService (business logic), AuthService (principal → User)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres implementations)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User aggregate, DTOs
//! └─────────────┘
//! ```
//!
//! Uniqueness of email and username is enforced twice: a pre-write probe in
//! the service (so collisions report the conflicting user's id) and unique
//! indexes at the storage layer (so concurrent writers get a single winner).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers::{self, UsersState},
//!     repository::InMemoryUserRepository,
//!     AuthService, UserService,
//! };
//!
//! let repository = InMemoryUserRepository::new();
//! let state = UsersState {
//!     users: UserService::new(repository.clone()),
//!     auth: AuthService::new(repository),
//! };
//! let router = handlers::router(state);
//! ```

pub mod auth;
pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod postgres;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use auth::AuthService;
pub use error::{Lookup, UserError, UserResult};
pub use models::{CreateUser, LoginRequest, Profile, UpdateUser, User, UserResponse};
pub use password::PasswordEncoder;
pub use postgres::PgUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
