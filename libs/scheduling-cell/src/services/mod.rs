pub mod availability;
pub mod booking;
pub mod notifications;
pub mod providers;
pub mod selection;
pub mod session;

pub use availability::*;
pub use booking::*;
pub use notifications::*;
pub use providers::*;
pub use selection::*;
pub use session::*;
