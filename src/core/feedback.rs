use crate::domain::model::TicketReceipt;
use crate::domain::ports::TicketStore;
use crate::utils::error::Result;
use std::sync::Arc;

pub struct FeedbackHandler<S: TicketStore> {
    store: Arc<S>,
}

impl<S: TicketStore> FeedbackHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn handle_positive(&self, customer_name: &str) -> String {
        format!(
            "Thank you for your kind words, {}! We're delighted to assist you.",
            customer_name
        )
    }

    /// Opens a ticket for the complaint; the reply carries the id verbatim so the
    /// customer can quote it in a later query.
    pub async fn handle_negative(&self, message: &str) -> Result<TicketReceipt> {
        let ticket_id = self.store.create(message).await?;
        let response = format!(
            "We apologize for the inconvenience. A new ticket #{} has been generated, and our team will follow up shortly.",
            ticket_id
        );
        Ok(TicketReceipt {
            ticket_id,
            response,
        })
    }
}
