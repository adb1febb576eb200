use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::media::VariantLabel;

/// The five renderings produced for one accepted image.
///
/// Each value is a storage key relative to the storage base
/// (`{category}/{identifier}_{label}.{ext}`). The label set is fixed: every
/// accepted candidate gets exactly these five entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DerivativeSet {
    pub original: String,
    pub thumbnail: String,
    pub small: String,
    pub medium: String,
    pub large: String,
}

/// A label→path map that does not match the five-label schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid derivative label set (missing: {missing:?}, unknown: {unknown:?})")]
pub struct InvalidLabelSet {
    pub missing: Vec<VariantLabel>,
    pub unknown: Vec<String>,
}

impl DerivativeSet {
    /// Build a set by asking `key_for` for each label's path.
    pub fn from_fn(mut key_for: impl FnMut(VariantLabel) -> String) -> Self {
        DerivativeSet {
            original: key_for(VariantLabel::Original),
            thumbnail: key_for(VariantLabel::Thumbnail),
            small: key_for(VariantLabel::Small),
            medium: key_for(VariantLabel::Medium),
            large: key_for(VariantLabel::Large),
        }
    }

    pub fn get(&self, label: VariantLabel) -> &str {
        match label {
            VariantLabel::Original => &self.original,
            VariantLabel::Thumbnail => &self.thumbnail,
            VariantLabel::Small => &self.small,
            VariantLabel::Medium => &self.medium,
            VariantLabel::Large => &self.large,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariantLabel, &str)> + '_ {
        VariantLabel::ALL
            .into_iter()
            .map(move |label| (label, self.get(label)))
    }

    pub fn paths(&self) -> Vec<&str> {
        self.iter().map(|(_, path)| path).collect()
    }

    pub fn into_map(self) -> BTreeMap<VariantLabel, String> {
        BTreeMap::from([
            (VariantLabel::Original, self.original),
            (VariantLabel::Thumbnail, self.thumbnail),
            (VariantLabel::Small, self.small),
            (VariantLabel::Medium, self.medium),
            (VariantLabel::Large, self.large),
        ])
    }
}

impl TryFrom<BTreeMap<String, String>> for DerivativeSet {
    type Error = InvalidLabelSet;

    fn try_from(mut map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let unknown: Vec<String> = map
            .keys()
            .filter(|key| VariantLabel::parse(key).is_none())
            .cloned()
            .collect();
        let missing: Vec<VariantLabel> = VariantLabel::ALL
            .into_iter()
            .filter(|label| !map.contains_key(label.as_str()))
            .collect();

        if !unknown.is_empty() || !missing.is_empty() {
            return Err(InvalidLabelSet { missing, unknown });
        }

        Ok(DerivativeSet::from_fn(|label| {
            map.remove(label.as_str()).unwrap_or_default()
        }))
    }
}
