//! Page Components

mod checkout;
mod home;
mod success;

pub use checkout::CheckoutPage;
pub use home::HomePage;
pub use success::SuccessPage;
