use super::state::AnnotationId;

/// Failures raised while picking, placing or presenting annotations.
///
/// None of these are fatal. The annotation collection and the scene graph stay
/// consistent; only panel fidelity degrades.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationError {
    /// The pointer ray hit no candidate.
    NoIntersection,
    /// Panels are enabled but no template entity carries the configured name.
    MissingTemplate { selector: String },
    /// An annotation expects a panel but none is registered for its id.
    MissingPanelForId(AnnotationId),
    /// The injected camera does not use a perspective projection.
    UnsupportedProjection,
    /// The injected camera or window entity could not be resolved.
    MissingViewport,
}

impl std::fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnotationError::NoIntersection => write!(f, "Pointer ray hit nothing"),
            AnnotationError::MissingTemplate { selector } => {
                write!(f, "There is no panel template named '{}'", selector)
            }
            AnnotationError::MissingPanelForId(id) => {
                write!(f, "There is no panel for annotation {}", id)
            }
            AnnotationError::UnsupportedProjection => {
                write!(f, "Annotation camera must use a perspective projection")
            }
            AnnotationError::MissingViewport => {
                write!(f, "Annotation camera or window entity is missing")
            }
        }
    }
}

impl std::error::Error for AnnotationError {}
