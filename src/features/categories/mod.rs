//! Hierarchical link categories.
//!
//! Categories form a tree via an optional parent reference and are
//! soft-deleted (an `active` timestamp marks removal, rows stay).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/categories` | List active categories |
//! | POST | `/api/v1/categories` | Create a category |
//! | GET | `/api/v1/categories/{id}` | Get one category |
//! | PUT | `/api/v1/categories/{id}` | Replace a category |
//! | DELETE | `/api/v1/categories/{id}` | Soft-delete a category |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::CategoryService;
