/// Structured error handling for SimBot
///
/// The engine never panics in production paths; every fallible operation
/// returns one of these variants and callers propagate with `?`.

// =============================================================================
// MAIN ERROR TYPE
// =============================================================================

#[derive(Debug, Clone)]
pub enum SimBotError {
    // Invalid search/engine configuration (programmer error, fail fast)
    Configuration(ConfigurationError),

    // Historical corpus loading & validation errors
    Corpus(CorpusError),

    // Errors raised while a search is running
    Search(SearchError),
}

impl std::fmt::Display for SimBotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimBotError::Configuration(e) => write!(f, "Configuration Error: {}", e),
            SimBotError::Corpus(e) => write!(f, "Corpus Error: {}", e),
            SimBotError::Search(e) => write!(f, "Search Error: {}", e),
        }
    }
}

impl std::error::Error for SimBotError {}

// =============================================================================
// CONFIGURATION ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum ConfigurationError {
    InvalidField { field: String, reason: String },
    EmptyPathPool,
    NonPositiveTimeBudget { seconds: f64 },
    ZeroHorizon,
    FileNotFound { path: String },
    Generic { message: String },
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigurationError::InvalidField { field, reason } => {
                write!(f, "Invalid config field '{}': {}", field, reason)
            }
            ConfigurationError::EmptyPathPool => {
                write!(f, "Info path pool is empty")
            }
            ConfigurationError::NonPositiveTimeBudget { seconds } => {
                write!(f, "Time budget must be positive, got {}s", seconds)
            }
            ConfigurationError::ZeroHorizon => {
                write!(f, "max_steps must be at least 1")
            }
            ConfigurationError::FileNotFound { path } => {
                write!(f, "Config file not found: {}", path)
            }
            ConfigurationError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// CORPUS ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum CorpusError {
    PathTooShort {
        path_index: usize,
        length: usize,
        required: usize,
    },
    NonFiniteChange {
        path_index: usize,
        step: usize,
    },
    ParseError {
        file: String,
        error: String,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for CorpusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusError::PathTooShort {
                path_index,
                length,
                required,
            } => {
                write!(
                    f,
                    "Info path {} has {} steps, horizon requires {}",
                    path_index, length, required
                )
            }
            CorpusError::NonFiniteChange { path_index, step } => {
                write!(
                    f,
                    "Info path {} has a non-finite change at step {}",
                    path_index, step
                )
            }
            CorpusError::ParseError { file, error } => {
                write!(f, "Failed to parse corpus file {}: {}", file, error)
            }
            CorpusError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// SEARCH ERROR TYPES
// =============================================================================

#[derive(Debug, Clone)]
pub enum SearchError {
    // A rollout or expansion tried to consume past the active path's end.
    // Indicates a pool/horizon mismatch, never silently truncated.
    PathExhausted {
        cursor: usize,
        path_length: usize,
    },
    InvalidNodeId {
        id: usize,
    },
    Generic {
        message: String,
    },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::PathExhausted {
                cursor,
                path_length,
            } => {
                write!(
                    f,
                    "Active info path exhausted: cursor {} past length {}",
                    cursor, path_length
                )
            }
            SearchError::InvalidNodeId { id } => {
                write!(f, "Arena has no node with id {}", id)
            }
            SearchError::Generic { message } => write!(f, "{}", message),
        }
    }
}

// =============================================================================
// STRUCTURED ERROR BUILDERS
// =============================================================================

impl SimBotError {
    /// Create a generic configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        SimBotError::Configuration(ConfigurationError::Generic {
            message: message.into(),
        })
    }

    /// Create an invalid-field configuration error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SimBotError::Configuration(ConfigurationError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Create a corpus parse error
    pub fn corpus_parse_error(file: impl Into<String>, error: impl Into<String>) -> Self {
        SimBotError::Corpus(CorpusError::ParseError {
            file: file.into(),
            error: error.into(),
        })
    }

    /// Create a path-exhausted search error
    pub fn path_exhausted(cursor: usize, path_length: usize) -> Self {
        SimBotError::Search(SearchError::PathExhausted {
            cursor,
            path_length,
        })
    }
}

pub type Result<T> = std::result::Result<T, SimBotError>;
