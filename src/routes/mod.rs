mod common;
mod entity;

pub use common::{common_routes_with_ready, BANNER};
pub use entity::entity_routes;
