//! Resource records returned by the admin API.
//!
//! The console routes these by id and displays their fields; it does not
//! interpret their contents. Each record keeps every field the server sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ResourceId;

macro_rules! record {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub id: Option<ResourceId>,
            #[serde(flatten)]
            pub fields: Map<String, Value>,
        }

        impl $name {
            pub fn field(&self, name: &str) -> Option<&Value> {
                self.fields.get(name)
            }

            pub fn str_field(&self, name: &str) -> Option<&str> {
                self.field(name)?.as_str()
            }
        }
    };
}

record!(
    /// The logged-in super-admin, as reported by `whoami`.
    AdminProfile
);
record!(
    /// Headline counters for the dashboard.
    DashboardStats
);
record!(
    /// A pending vendor onboarding request.
    VendorRequest
);
record!(Vendor);
record!(Product);
record!(
    /// A pending delivery agent onboarding request.
    DeliveryRequest
);
record!(DeliveryAgent);
record!(
    /// Global or per-category commission rate.
    CommissionSetting
);
record!(Report);
record!(
    /// A customer account.
    AdminUser
);
record!(Order);
record!(OrderReturn);
record!(
    /// A delivery agent's assignment to an order.
    DeliveryAssignment
);
