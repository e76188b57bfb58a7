/// Which pipeline stage an error came from.
///
/// The kind decides the process exit code; the message is for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Config file, CLI overrides, or missing API key.
    Config,
    /// Sales CSV missing, unreadable, or missing a required column.
    Sales,
    /// Forecast request failed or returned no usable entries.
    Weather,
    /// Model artifact missing, malformed, schema mismatch, or bad prediction.
    Model,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Sales => 3,
            ErrorKind::Weather => 4,
            ErrorKind::Model => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn sales(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Sales, message)
    }

    pub fn weather(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Weather, message)
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Model, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let codes = [
            ErrorKind::Config.exit_code(),
            ErrorKind::Sales.exit_code(),
            ErrorKind::Weather.exit_code(),
            ErrorKind::Model.exit_code(),
        ];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn display_is_the_message() {
        let err = AppError::weather("Failed to fetch weather forecast.");
        assert_eq!(err.to_string(), "Failed to fetch weather forecast.");
        assert_eq!(err.kind(), ErrorKind::Weather);
        assert_eq!(err.exit_code(), 4);
    }
}
