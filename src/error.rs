/// Error while loading concepts or configuration.
///
/// Only the I/O edges of the crate can fail; layout, animation and picking
/// always degrade to a valid position instead of returning an error.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadError {
    pub message: String,
    pub phase: &'static str,
}

impl LoadError {
    pub fn new(phase: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            phase,
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.phase, self.message)
    }
}

impl std::error::Error for LoadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_phase() {
        let err = LoadError::new("read", "no such file");
        assert_eq!(err.to_string(), "[read] no such file");
    }
}
