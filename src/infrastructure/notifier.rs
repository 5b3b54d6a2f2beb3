//! Order confirmation delivery.
//!
//! `QueuedDispatcher` only pushes the committed order onto a channel; a
//! background worker turns it into an e-mail and hands it to a `Mailer`,
//! bounded by a timeout. Delivery failures end up in the log and nowhere else.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ports::NotificationDispatcher;

#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub id: Uuid,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait Mailer: Send + Sync + 'static {
    fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}

/// Writes messages to the log instead of talking to an SMTP relay.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        log::info!(
            "Email {} to {}: {}\n{}",
            message.id,
            message.to,
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// Builds the confirmation e-mail, or `None` when the order has no address.
pub fn confirmation_email(shop_name: &str, order: &Order) -> Option<EmailMessage> {
    let to = order.email.trim();
    if to.is_empty() {
        return None;
    }

    let greeting = if order.full_name.is_empty() {
        "customer"
    } else {
        order.full_name.as_str()
    };
    let lines = order
        .details
        .iter()
        .map(|d| {
            format!(
                "- product #{} x {} @ {} = {}",
                d.product_id, d.quantity, d.price, d.total_money
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let shipping_to = if order.shipping_address.is_empty() {
        String::new()
    } else {
        format!("Shipping to: {}\n", order.shipping_address)
    };
    let body = format!(
        "Hello {},\n\nThank you for your order #{}.\n\n{}\n\nTotal: {}\nExpected shipping date: {}\n{}\n{}",
        greeting, order.id, lines, order.total_money, order.shipping_date, shipping_to, shop_name
    );

    Some(EmailMessage {
        id: Uuid::new_v4(),
        to: to.to_string(),
        subject: format!(
            "{} | Congratulations! Your order is being received and on its way!",
            shop_name
        ),
        body,
    })
}

#[derive(Clone)]
pub struct QueuedDispatcher {
    sender: mpsc::UnboundedSender<Order>,
}

impl NotificationDispatcher for QueuedDispatcher {
    fn dispatch(&self, order: &Order) -> Result<(), DomainError> {
        self.sender
            .send(order.clone())
            .map_err(|_| DomainError::Notification("notification worker is not running".to_string()))
    }
}

/// Start the delivery worker on the current tokio runtime.
///
/// The worker stops once every `QueuedDispatcher` clone has been dropped.
pub fn spawn_notification_worker(
    mailer: Arc<dyn Mailer>,
    shop_name: String,
    send_timeout: Duration,
) -> (QueuedDispatcher, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Order>();

    let handle = tokio::spawn(async move {
        while let Some(order) = receiver.recv().await {
            let Some(message) = confirmation_email(&shop_name, &order) else {
                log::warn!("Order {} has no email address, confirmation skipped", order.id);
                continue;
            };

            let mailer = mailer.clone();
            let message_id = message.id;
            let send = tokio::task::spawn_blocking(move || mailer.send(&message));
            match tokio::time::timeout(send_timeout, send).await {
                Ok(Ok(Ok(()))) => {
                    log::debug!("Confirmation {} sent for order {}", message_id, order.id)
                }
                Ok(Ok(Err(e))) => {
                    log::error!("Confirmation for order {} failed: {}", order.id, e)
                }
                Ok(Err(e)) => {
                    log::error!("Confirmation task for order {} panicked: {}", order.id, e)
                }
                Err(_) => log::error!(
                    "Confirmation for order {} timed out after {:?}",
                    order.id,
                    send_timeout
                ),
            }
        }
        log::info!("Notification worker stopped");
    });

    (QueuedDispatcher { sender }, handle)
}
