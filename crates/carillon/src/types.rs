use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// One notification type as described by the service, localized for the
/// locale the request carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationType {
    /// Unique identifier, stable across locales.
    pub key: SmolStr,
    /// Localized description text.
    pub description: String,
    /// Whether this type is currently in service.
    pub is_active: bool,
    /// Whether this type is deprecated and should be marked as such.
    pub is_deprecated: bool,
    /// Localized explanation for the deprecation.
    ///
    /// Only meaningful when `is_deprecated` is set. The server may omit it
    /// even then; a reason on a non-deprecated entry is a data contract
    /// violation we tolerate rather than reject.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated_reason: Option<String>,
}

/// Ordered list of notification types, in server order.
///
/// No client-side sorting, filtering, or deduplication is applied; `key`
/// uniqueness is trusted from the source.
pub type NotificationTypeList = Vec<NotificationType>;

/// Response envelope for the notification-types endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTypeListResponse {
    /// The listed types, verbatim.
    pub notification_types: NotificationTypeList,
}
