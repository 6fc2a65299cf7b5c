use derive_more::{Display, Error};

pub type Result<T> = std::result::Result<T, JanusError>;

/// Structural failures. Anything in here aborts the whole file: a rollover that hits one of these
/// never writes a destination.
///
/// Semantic anomalies found during replay (stale orders, fills for unknown orders) are not errors,
/// they are counted in [ReplayStats](crate::ledger::ReplayStats).
#[derive(Debug, Display, Error)]
pub enum JanusError {
    #[display("malformed record at offset {offset}: {reason}")]
    MalformedRecord { offset: usize, reason: String },
    #[display("record body of {len} bytes does not fit the length field")]
    BodyTooLong { len: usize },
    #[display("{_0}")]
    Io(#[error(source)] std::io::Error),
}

impl From<std::io::Error> for JanusError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl JanusError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord { .. })
    }
}
