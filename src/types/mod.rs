//! Shared request/response types.

mod pagination;
mod response;

pub use pagination::{Page, Paginated, PaginationMeta, PaginationParams};
pub use response::{CountResponse, Created, MessageResponse, NoContent};
