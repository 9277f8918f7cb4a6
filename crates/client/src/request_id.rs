use uuid::Uuid;

/// Source of the per-call `X-Request-Id` value.
pub trait RequestIdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Fresh random UUID per call, uppercase hyphenated.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidRequestIds;

impl RequestIdGenerator for UuidRequestIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }
}
