//! Safety verdicts returned by the dispatcher

use serde::{Deserialize, Serialize};

use crate::error::{Error, RejectionKind};

/// Boolean outcome plus the category that caused a rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub safe: bool,
    pub rejection: Option<RejectionKind>,
}

impl Verdict {
    pub fn safe() -> Self {
        Self {
            safe: true,
            rejection: None,
        }
    }

    pub fn rejected(kind: RejectionKind) -> Self {
        Self {
            safe: false,
            rejection: Some(kind),
        }
    }
}

impl From<&crate::error::Result<()>> for Verdict {
    fn from(outcome: &crate::error::Result<()>) -> Self {
        match outcome {
            Ok(()) => Verdict::safe(),
            Err(e) => Verdict::rejected(Error::kind(e)),
        }
    }
}
