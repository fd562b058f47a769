pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed record stream (document {document}): {message}")]
    RecordStream { document: usize, message: String },
}
