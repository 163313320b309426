/// Errors surfaced by the shake engine and preset loading.
///
/// Everything except [`QuakeError::MissingCamera`] is a configuration error:
/// it is reported to the caller and leaves engine state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum QuakeError {
    /// A bump in `Target` mode was played without a target position.
    MissingBumpTarget,
    /// Magnitude must be finite and strictly positive.
    InvalidMagnitude(f32),
    /// A duration field was negative or not finite.
    NegativeDuration { field: &'static str, value: f32 },
    /// A keyframed curve had non-finite or out-of-order keys.
    InvalidCurve(&'static str),
    /// Lookup of a preset name that is not in the library.
    UnknownPreset(String),
    /// A preset or config file failed to decode.
    Parse(String),
    /// A preset or config file could not be read.
    Io(String),
    /// No camera was available when the engine was built.
    MissingCamera,
}

impl QuakeError {
    /// Whether the error comes from a bad preset rather than a broken environment.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::MissingCamera)
    }
}

impl std::fmt::Display for QuakeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBumpTarget => write!(
                f,
                "bump preset uses Target mode but no target was given; call play_at with a target"
            ),
            Self::InvalidMagnitude(m) => write!(f, "magnitude must be > 0, got {m}"),
            Self::NegativeDuration { field, value } => {
                write!(f, "{field} must be a finite value >= 0, got {value}")
            },
            Self::InvalidCurve(field) => {
                write!(f, "{field} keyframes must be finite and sorted by time")
            },
            Self::UnknownPreset(name) => write!(f, "unknown preset: {name}"),
            Self::Parse(e) => write!(f, "parse error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::MissingCamera => write!(f, "no camera found; attach a camera to the shake rig"),
        }
    }
}

impl std::error::Error for QuakeError {}

impl From<toml::de::Error> for QuakeError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<std::io::Error> for QuakeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
