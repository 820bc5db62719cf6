//! Classification heads registered on the `drug_gcn` model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Prediction heads the model can register by name.
///
/// The toolkit refuses any other head name, so an unknown
/// `--classification-head-name` is rejected here before launch.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum ClassificationHead {
    /// Two-layer MLP over the concatenated drug-pair encodings.
    #[default]
    #[serde(rename = "bclsmlp")]
    #[strum(serialize = "bclsmlp")]
    BinaryClassMlp,

    /// Feature-integration head combining pair encodings with relation features.
    #[serde(rename = "bclsFeatInt")]
    #[strum(serialize = "bclsFeatInt")]
    BinaryClassFeatIntegration,
}

impl ClassificationHead {
    /// All registered heads, default first.
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// Name passed as `--classification-head-name`.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Short human description used by `ddi-infer archs`.
    pub const fn description(self) -> &'static str {
        match self {
            Self::BinaryClassMlp => "binary-class MLP head",
            Self::BinaryClassFeatIntegration => "binary-class feature-integration head",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_registered_names() {
        assert_eq!(
            ClassificationHead::from_str("bclsmlp").unwrap(),
            ClassificationHead::BinaryClassMlp
        );
        assert_eq!(
            ClassificationHead::from_str("bclsFeatInt").unwrap(),
            ClassificationHead::BinaryClassFeatIntegration
        );
    }

    #[test]
    fn head_names_are_case_sensitive() {
        assert!(ClassificationHead::from_str("bclsfeatint").is_err());
        assert!(ClassificationHead::from_str("mlp").is_err());
    }

    #[test]
    fn default_is_mlp() {
        assert_eq!(ClassificationHead::default().name(), "bclsmlp");
    }
}
