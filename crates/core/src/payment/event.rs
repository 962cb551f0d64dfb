use crate::types::UserId;

/// An authenticated payment notification.
///
/// Only the webhook boundary constructs these, after the provider's
/// signature has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    Succeeded {
        payment_reference: String,
        /// `Uuid::nil()` when the provider payload carried no usable user.
        user_id: UserId,
    },
    Failed {
        payment_reference: String,
    },
}

impl PaymentEvent {
    pub fn payment_reference(&self) -> &str {
        match self {
            Self::Succeeded {
                payment_reference, ..
            }
            | Self::Failed { payment_reference } => payment_reference,
        }
    }
}
