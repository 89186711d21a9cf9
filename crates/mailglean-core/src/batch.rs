use serde::{Deserialize, Serialize};

use crate::extract::ExtractionResult;

/// One retained message's extraction output, carried from the batch runner
/// to the sinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageExtraction {
    pub message_id: String,
    pub result: ExtractionResult,
}
