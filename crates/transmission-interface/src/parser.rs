//! Extracting transmission declarations from a description document.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::error::{Result, TransmissionError};
use crate::info::TransmissionInfo;
use crate::retriever::ResourceRetriever;

pub trait DescriptionParser: Send + Sync {
    /// Declarations in document order.
    fn parse(&self, description: &str) -> Result<Vec<TransmissionInfo>>;
}

/// Top level of a YAML description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransmissionDocument {
    #[serde(default)]
    pub transmissions: Vec<TransmissionInfo>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDescriptionParser;

impl DescriptionParser for YamlDescriptionParser {
    fn parse(&self, description: &str) -> Result<Vec<TransmissionInfo>> {
        let val: Value = serde_yaml::from_str(description)
            .map_err(|e| TransmissionError::Parse(format!("parsing yaml: {e}")))?;
        let doc: TransmissionDocument = serde_yaml::from_value(val)
            .map_err(|e| TransmissionError::Parse(format!("decoding transmissions: {e}")))?;
        Ok(doc.transmissions)
    }
}

/// Fetch `uri` and parse it.
pub fn read_description(
    retriever: &dyn ResourceRetriever,
    parser: &dyn DescriptionParser,
    uri: &str,
) -> Result<Vec<TransmissionInfo>> {
    let bytes = retriever.get(uri)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| TransmissionError::Parse(format!("{uri} is not UTF-8: {e}")))?;
    parser.parse(&text)
}
