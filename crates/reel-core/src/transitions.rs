// crates/reel-core/src/transitions.rs

use serde::{Deserialize, Serialize};

/// Supported transition kinds. Anything the document parser doesn't
/// recognize degrades to `None` rather than failing the whole parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    None,
    Dissolve,
}

impl Default for TransitionKind {
    fn default() -> Self {
        TransitionKind::None
    }
}

impl TransitionKind {
    /// Parse a document-supplied transition type tag. Unrecognized tags are
    /// not an error — they degrade to `None`, same as an absent transition.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "SMPTE_Dissolve" | "Dissolve" | "Dissolve_Transition" => TransitionKind::Dissolve,
            _ => TransitionKind::None,
        }
    }
}
