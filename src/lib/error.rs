pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Duplicate Index: {0}")]
    DuplicateIndex(&'static str),

    #[error("Unknown Connection: {0}")]
    UnknownConnection(String),
}
