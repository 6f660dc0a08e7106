//! Stored links, each belonging to one category.
//!
//! Link names and URLs are unique across all rows; removal is a
//! soft-delete (an `active` timestamp marks removal, rows stay).
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/v1/links` | List active links |
//! | POST | `/api/v1/links` | Create a link |
//! | GET | `/api/v1/links/{id}` | Get one link |
//! | PUT | `/api/v1/links/{id}` | Replace a link |
//! | DELETE | `/api/v1/links/{id}` | Soft-delete a link |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::LinkService;
