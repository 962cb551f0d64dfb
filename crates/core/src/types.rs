/// Users are keyed by UUID; the id doubles as the access-token subject.
pub type UserId = uuid::Uuid;

/// Session ids are UUID v4 and form the public half of a refresh credential.
pub type SessionId = uuid::Uuid;

pub type OrderId = uuid::Uuid;

/// Catalog product ids are assigned by the external pricing provider.
pub type ProductId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
