use northwind_order::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
}
