//! Request bodies sent by the admin API client.

use serde::Serialize;

/// `{ "reason": ... }`, used by approve/reject/block/unblock actions.
#[derive(Debug, Clone, Serialize)]
pub struct ReasonPayload<'a> {
    pub reason: &'a str,
}

/// An empty JSON object body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmptyPayload {}

#[derive(Debug, Clone, Serialize)]
pub struct ToggleBlockPayload<'a> {
    pub action: &'a str,
    pub reason: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryStatusPayload<'a> {
    pub status: &'a str,
    pub notes: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOtpPayload<'a> {
    pub otp_code: &'a str,
}
