// Offset/limit window shared by the GraphQL and HTTP list surfaces.

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    pub offset: u64,
    pub limit: u64,
}

impl ListWindow {
    pub fn new(offset: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            offset: offset.unwrap_or(0),
            limit: limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        }
    }

    /// GraphQL `Int` arguments are signed. Negative values count as zero.
    pub fn from_signed(offset: Option<i64>, limit: Option<i64>) -> Self {
        let unsigned = |value: Option<i64>| value.map(|v| v.max(0) as u64);
        Self::new(unsigned(offset), unsigned(limit))
    }
}
