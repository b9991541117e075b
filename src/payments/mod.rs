pub mod provider;
pub mod razorpay;
pub mod stripe;

pub use provider::{CheckoutRequest, CheckoutSession, PaymentProvider, WebhookEvent};
pub use razorpay::RazorpayClient;
pub use stripe::StripeClient;
