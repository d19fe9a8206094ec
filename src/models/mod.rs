pub mod carpool_payment;
pub mod carpool_request;
pub mod carpool_trip;
pub mod event;
pub mod event_hosting;
pub mod event_hosting_request;
pub mod event_subscription;
pub mod membership;
pub mod request_status;
pub mod user;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::carpool_payment::{self, Entity as CarpoolPayment};
    pub use super::carpool_request::{self, Entity as CarpoolRequest};
    pub use super::carpool_trip::{self, Entity as CarpoolTrip};
    pub use super::event::{self, Entity as Event};
    pub use super::event_hosting::{self, Entity as EventHosting};
    pub use super::event_hosting_request::{self, Entity as EventHostingRequest};
    pub use super::event_subscription::{self, Entity as EventSubscription};
    pub use super::membership::{self, Entity as Membership};
    pub use super::request_status::RequestStatus;
    pub use super::user::{self, Entity as User};
}
