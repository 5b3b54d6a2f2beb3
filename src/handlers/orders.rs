use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::application::order_service::{CreatedOrder, OrderService};
use crate::domain::order::{CartLine, Order, OrderDetail, OrderRequest, OrderStatus, OrderUpdate};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartItemRequest {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub user_id: i64,
    #[serde(rename = "fullname", alias = "full_name", default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
    /// Client-side total. The server recomputes it from catalog prices.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "100.00")]
    pub total_money: Option<BigDecimal>,
    #[serde(default)]
    pub shipping_method: String,
    #[serde(default)]
    pub shipping_address: String,
    /// Defaults to three days after the order date.
    #[serde(default)]
    pub shipping_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub cart_items: Vec<CartItemRequest>,
}

impl From<CreateOrderRequest> for OrderRequest {
    fn from(r: CreateOrderRequest) -> Self {
        Self {
            user_id: r.user_id,
            full_name: r.full_name,
            email: r.email,
            phone_number: r.phone_number,
            address: r.address,
            note: r.note,
            total_money: r.total_money,
            shipping_method: r.shipping_method,
            shipping_address: r.shipping_address,
            shipping_date: r.shipping_date,
            payment_method: r.payment_method,
            cart_items: r
                .cart_items
                .into_iter()
                .map(|c| CartLine {
                    product_id: c.product_id,
                    quantity: c.quantity,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub user_id: i64,
    #[serde(rename = "fullname", alias = "full_name", default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub shipping_method: String,
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub shipping_date: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl From<UpdateOrderRequest> for OrderUpdate {
    fn from(r: UpdateOrderRequest) -> Self {
        Self {
            user_id: r.user_id,
            full_name: r.full_name,
            email: r.email,
            phone_number: r.phone_number,
            address: r.address,
            note: r.note,
            shipping_method: r.shipping_method,
            shipping_address: r.shipping_address,
            shipping_date: r.shipping_date,
            payment_method: r.payment_method,
            status: r.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub price: String,
    pub quantity: i32,
    pub total_money: String,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(d: OrderDetail) -> Self {
        Self {
            id: d.id,
            order_id: d.order_id,
            product_id: d.product_id,
            price: d.price.to_string(),
            quantity: d.quantity,
            total_money: d.total_money.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "fullname")]
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
    pub total_money: String,
    pub shipping_method: String,
    pub shipping_address: String,
    pub shipping_date: NaiveDate,
    pub payment_method: String,
    pub status: OrderStatus,
    pub active: bool,
    pub order_date: String,
    pub order_details: Vec<OrderDetailResponse>,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            user_id: o.user_id,
            full_name: o.full_name,
            email: o.email,
            phone_number: o.phone_number,
            address: o.address,
            note: o.note,
            total_money: o.total_money.to_string(),
            shipping_method: o.shipping_method,
            shipping_address: o.shipping_address,
            shipping_date: o.shipping_date,
            payment_method: o.payment_method,
            status: o.status,
            active: o.active,
            order_date: o.order_date.to_rfc3339(),
            order_details: o.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order: OrderResponse,
    /// Non-fatal problems, e.g. a confirmation that could not be queued.
    pub warnings: Vec<String>,
}

impl From<CreatedOrder> for CreateOrderResponse {
    fn from(c: CreatedOrder) -> Self {
        Self {
            order: c.order.into(),
            warnings: c.warnings,
        }
    }
}

fn to_responses(orders: Vec<Order>) -> Vec<OrderResponse> {
    orders.into_iter().map(Into::into).collect()
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders
///
/// Prices the cart against the catalog and stores the order with all of its
/// details in a single transaction. The confirmation e-mail is queued after
/// commit; failing to queue it only adds a warning.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = CreateOrderResponse),
        (status = 400, description = "Invalid cart, contact data or shipping date"),
        (status = 404, description = "Unknown user or product"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<OrderService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = OrderRequest::from(body.into_inner());

    let created = web::block(move || service.create_order(request)).await??;

    Ok(HttpResponse::Created().json(CreateOrderResponse::from(created)))
}

/// GET /orders/{id}
///
/// Returns the order with its details, including soft-deleted orders.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || service.get_order(id)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PUT /orders/{id}
///
/// Administrative correction of contact, shipping and status fields.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Unknown order or user"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let update = OrderUpdate::from(body.into_inner());

    let order = web::block(move || service.update_order(id, update)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /orders/{id}
///
/// Soft delete: the order stays readable by id but leaves the listings.
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deactivated"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || service.delete_order(id)).await??;

    Ok(HttpResponse::Ok().json(json!({ "message": format!("Order {} deleted", id) })))
}

/// PATCH /orders/{id}/status
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = i64, Path, description = "Order id")),
    request_body = ChangeStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = OrderResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn change_status(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
    body: web::Json<ChangeStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let status = body.into_inner().status;

    let order = web::block(move || service.change_status(id, status)).await??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /orders/history/{user_id}
///
/// Purchase history of a user, newest first, active orders only.
#[utoipa::path(
    get,
    path = "/orders/history/{user_id}",
    params(("user_id" = i64, Path, description = "Owner id")),
    responses(
        (status = 200, description = "Orders of the user", body = Vec<OrderResponse>),
    ),
    tag = "orders"
)]
pub async fn get_orders_by_user(
    service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();

    let orders = web::block(move || service.find_by_user(user_id)).await??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

/// GET /orders?status=pending
#[utoipa::path(
    get,
    path = "/orders",
    params(("status" = OrderStatus, Query, description = "Status to filter on")),
    responses(
        (status = 200, description = "Active orders in that status", body = Vec<OrderResponse>),
        (status = 400, description = "Missing or unknown status"),
    ),
    tag = "orders"
)]
pub async fn list_orders_by_status(
    service: web::Data<OrderService>,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let status = query.into_inner().status;

    let orders = web::block(move || service.find_by_status(status)).await??;

    Ok(HttpResponse::Ok().json(to_responses(orders)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());
    let query_config = web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(json_config).app_data(query_config).service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(list_orders_by_status))
            .route("/history/{user_id}", web::get().to(get_orders_by_user))
            .route("/{id}", web::get().to(get_order))
            .route("/{id}", web::put().to(update_order))
            .route("/{id}", web::delete().to(delete_order))
            .route("/{id}/status", web::patch().to(change_status)),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::Value;

    use super::*;
    use crate::domain::order::Account;
    use crate::infrastructure::memory::{
        InMemoryAccounts, InMemoryCatalog, InMemoryOrderRepository, RecordingDispatcher,
    };

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 23, 59, 0).unwrap()
    }

    fn service() -> OrderService {
        let accounts = Arc::new(InMemoryAccounts::new());
        accounts.insert(Account {
            id: 7,
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone_number: "0900000000".to_string(),
        });
        let catalog = Arc::new(InMemoryCatalog::new());
        catalog.insert_product(3, "Mug", "50.0".parse().unwrap());

        OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            accounts,
            catalog,
            Arc::new(RecordingDispatcher::new()),
        )
        .with_clock(fixed_now)
    }

    fn order_body(shipping_date: Option<String>) -> Value {
        json!({
            "user_id": 7,
            "fullname": "Jane Doe",
            "email": "jane@example.com",
            "phone_number": "0900000000",
            "address": "1 Main St",
            "total_money": 100.0,
            "shipping_method": "express",
            "shipping_address": "1 Main St",
            "shipping_date": shipping_date,
            "payment_method": "cod",
            "cart_items": [{ "product_id": 3, "quantity": 2 }]
        })
    }

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(service()))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn create_then_get_order() {
        let app = app!();

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(None))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let order = &body["order"];
        assert_eq!(order["status"], "pending");
        assert_eq!(order["active"], true);
        assert_eq!(order["order_details"][0]["quantity"], 2);
        assert_eq!(order["order_details"][0]["price"], "50.0");
        assert_eq!(order["order_details"][0]["total_money"], "100.0");
        assert_eq!(order["total_money"], "100.0");
        assert_eq!(order["shipping_date"], "2024-06-04");
        assert_eq!(order["order_date"], "2024-06-01T23:59:00+00:00");
        assert_eq!(body["warnings"].as_array().unwrap().len(), 0);

        let id = order["id"].as_i64().unwrap();
        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn past_shipping_date_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(Some("2024-05-31".to_string())))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("shipping date"));
    }

    #[actix_web::test]
    async fn unknown_product_is_not_found() {
        let app = app!();
        let mut body = order_body(None);
        body["cart_items"] = json!([{ "product_id": 99, "quantity": 1 }]);

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn overlong_note_is_bad_request() {
        let app = app!();
        let mut body = order_body(None);
        body["note"] = json!("n".repeat(101));

        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("note"));
    }

    #[actix_web::test]
    async fn get_unknown_order_is_not_found() {
        let app = app!();
        let req = test::TestRequest::get().uri("/orders/123").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn delete_hides_order_from_history() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["order"]["id"].as_i64().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/orders/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/orders/history/7").to_request();
        let history: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(history.as_array().unwrap().len(), 0);

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", id))
            .to_request();
        let order: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(order["active"], false);
        assert_eq!(order["order_details"].as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn status_change_and_listing_by_status() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["order"]["id"].as_i64().unwrap();

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({ "status": "confirmed" }))
            .to_request();
        let order: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(order["status"], "confirmed");

        let req = test::TestRequest::patch()
            .uri(&format!("/orders/{}/status", id))
            .set_json(json!({ "status": "pending" }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );

        let req = test::TestRequest::get()
            .uri("/orders?status=confirmed")
            .to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn update_overwrites_contact_fields() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/orders")
            .set_json(order_body(None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["order"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/orders/{}", id))
            .set_json(json!({
                "user_id": 7,
                "fullname": "Jane Q. Doe",
                "phone_number": "0922222222",
                "note": "ring twice",
                "status": "confirmed"
            }))
            .to_request();
        let order: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(order["fullname"], "Jane Q. Doe");
        assert_eq!(order["note"], "ring twice");
        assert_eq!(order["status"], "confirmed");
        assert_eq!(order["total_money"], "100.0");
    }
}
