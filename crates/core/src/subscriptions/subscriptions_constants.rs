/// Maximum length of a service name, in characters.
pub const MAX_SERVICE_NAME_LEN: usize = 255;

/// Error messages returned to callers of the summary endpoint.
pub mod messages {
    pub const EMPTY_DATE: &str = "date value cannot be empty";
    pub const INVALID_DATE_FORMAT: &str = "date must be in YYYY-MM or MM-YYYY format";
    pub const END_BEFORE_START: &str = "end must be after start";
    pub const INVALID_USER_ID: &str = "invalid user_id";
}

/// Accepted textual names for [`super::AggregationStrategy`].
pub mod strategy_names {
    pub const STORAGE: &str = "storage";
    pub const IN_MEMORY: &str = "in_memory";
}
