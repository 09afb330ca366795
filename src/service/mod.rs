//! Services: generic CRUD over the SQL builder, request validation, and the
//! multi-row units of work (customer cascade, order associations).

mod crud;
mod customers;
mod orders;
mod validation;
pub use crud::CrudService;
pub use customers::CustomerService;
pub use orders::{OrderService, PRODUCTS_KEY};
pub use validation::{integer_list, RequestValidator};
