//! Entity routes: the verb + path -> handler table. Paths come from each entity's segment.

use crate::handlers::{accounts, customers, orders, products};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn entity_routes(state: AppState) -> Router {
    let model = state.model.clone();
    let (c, a, p, o) = (&model.customers, &model.customer_accounts, &model.products, &model.orders);
    Router::new()
        .route(&c.collection_path(), get(customers::list).post(customers::create))
        .route(
            &c.item_path(),
            get(customers::read).put(customers::update).delete(customers::delete),
        )
        .route(&a.collection_path(), get(accounts::list).post(accounts::create))
        .route(
            &a.item_path(),
            get(accounts::read).put(accounts::update).delete(accounts::delete),
        )
        .route(&p.collection_path(), get(products::list).post(products::create))
        .route(
            &p.item_path(),
            get(products::read).put(products::update).delete(products::delete),
        )
        .route(&o.collection_path(), get(orders::list).post(orders::create))
        .route(
            &o.item_path(),
            get(orders::read).put(orders::update).delete(orders::delete),
        )
        .with_state(state)
}
