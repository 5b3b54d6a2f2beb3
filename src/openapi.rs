use utoipa::OpenApi;

use crate::domain::order::OrderStatus;
use crate::handlers::{health, orders};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::change_status,
        orders::get_orders_by_user,
        orders::list_orders_by_status,
    ),
    components(schemas(
        OrderStatus,
        orders::CartItemRequest,
        orders::CreateOrderRequest,
        orders::UpdateOrderRequest,
        orders::ChangeStatusRequest,
        orders::OrderDetailResponse,
        orders::OrderResponse,
        orders::CreateOrderResponse,
    )),
    tags(
        (name = "orders", description = "Order creation and lifecycle"),
        (name = "health", description = "Liveness check"),
    )
)]
pub struct ApiDoc;
