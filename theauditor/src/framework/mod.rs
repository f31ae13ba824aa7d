//! Framework awareness: two distinct concerns share this module.
//!
//! [`heuristics`] recognizes framework-implied usage (decorators, magic method
//! names) so the dead-code analyzer doesn't flag a Flask view or Django
//! viewset method as unused just because nothing in the repo calls it
//! directly. [`registry`] and [`detector`] are unrelated to dead-code
//! analysis: they build the per-directory framework/version inventory that
//! feeds the indexed store and, downstream, the taint tracker's sanitizer
//! catalog (validation-framework validators) and the FCE's context bundles.

pub mod detector;
pub mod heuristics;
pub mod registry;

pub use heuristics::{
    detect_framework_usage, get_framework_imports, FrameworkAwareVisitor, FRAMEWORK_DECORATORS,
    FRAMEWORK_FUNCTIONS,
};
pub use registry::{DetectionSource, FrameworkEntry, FRAMEWORK_REGISTRY};
pub use detector::{detect_frameworks, FrameworkRecord};
