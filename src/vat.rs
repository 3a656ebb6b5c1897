use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Standard VAT rates (percent) of the countries sales are declared in.
///
/// Keys are matched byte for byte against the country column of the export,
/// so "Netherlands" and "The Netherlands" are different countries here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VatTable(BTreeMap<String, f64>);

const EU_VAT: &[(&str, f64)] = &[
    ("Ireland", 23.0),
    ("Austria", 20.0),
    ("Belgium", 21.0),
    ("Bulgaria", 20.0),
    ("Czech Republic", 21.0),
    ("Denmark", 25.0),
    ("Estonia", 20.0),
    ("Greece", 24.0),
    ("Spain", 21.0),
    ("Italy", 22.0),
    ("Cyprus", 19.0),
    ("Croatia", 25.0),
    ("Latvia", 21.0),
    ("Poland", 23.0),
    ("Luxembourg", 17.0),
    ("Malta", 18.0),
    ("The Netherlands", 21.0),
    ("Portugal", 23.0),
    ("France", 20.0),
    ("Romania", 19.0),
    ("Slovakia", 20.0),
    ("Slovenia", 22.0),
    ("Finland", 24.0),
    ("Sweden", 25.0),
    ("Hungary", 27.0),
    ("Germany", 19.0),
];

impl Default for VatTable {
    fn default() -> Self {
        EU_VAT.iter().map(|(c, r)| (c.to_string(), *r)).collect()
    }
}

impl FromIterator<(String, f64)> for VatTable {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl VatTable {
    pub fn rate(&self, country: &str) -> Option<f64> {
        self.0.get(country).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(c, r)| (c.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rates must be finite and non-negative, otherwise the VAT split is meaningless.
    pub fn invalid_rates(&self) -> Vec<(&str, f64)> {
        self.iter()
            .filter(|(_, r)| !r.is_finite() || *r < 0.0)
            .collect()
    }
}
