use std::collections::BTreeMap;

use crate::models::{EuTotals, SaleRecord};
use crate::vat::VatTable;

/// Number of sales rows per country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryCounts(BTreeMap<String, usize>);

impl CountryCounts {
    fn add(&mut self, country: &str) {
        *self.0.entry(country.to_string()).or_default() += 1;
    }

    pub fn get(&self, country: &str) -> usize {
        self.0.get(country).copied().unwrap_or(0)
    }

    /// Total number of sales across all countries.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Number of distinct countries.
    pub fn countries(&self) -> usize {
        self.0.len()
    }

    /// Countries ordered by sales count, highest first; ties stay alphabetical.
    pub fn by_count_desc(&self) -> Vec<(&str, usize)> {
        let mut items: Vec<(&str, usize)> = self.0.iter().map(|(c, n)| (c.as_str(), *n)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1));
        items
    }
}

pub struct SalesSplit {
    pub eu: BTreeMap<String, EuTotals>,
    pub non_eu: Vec<SaleRecord>,
    pub eu_counts: CountryCounts,
    pub non_eu_counts: CountryCounts,
}

impl SalesSplit {
    pub fn eu_totals(&self) -> EuTotals {
        self.eu.values().fold(
            EuTotals {
                without_vat: 0.0,
                vat: 0.0,
                total: 0.0,
            },
            |acc, t| EuTotals {
                without_vat: acc.without_vat + t.without_vat,
                vat: acc.vat + t.vat,
                total: acc.total + t.total,
            },
        )
    }

    pub fn non_eu_total(&self) -> f64 {
        self.non_eu.iter().map(|r| r.total).sum()
    }
}

/// Partition `records` into EU countries (those with a VAT rate) and the rest.
///
/// EU sales are summed per country first and only then decomposed into the
/// net amount and VAT; non-EU sales are kept row by row in their input order.
pub fn split(records: &[SaleRecord], vat: &VatTable) -> SalesSplit {
    let mut eu_sums: BTreeMap<String, f64> = BTreeMap::new();
    let mut non_eu = Vec::new();
    let mut eu_counts = CountryCounts::default();
    let mut non_eu_counts = CountryCounts::default();

    for record in records {
        if vat.rate(&record.country).is_some() {
            *eu_sums.entry(record.country.clone()).or_default() += record.total;
            eu_counts.add(&record.country);
        } else {
            non_eu.push(record.clone());
            non_eu_counts.add(&record.country);
        }
    }

    let eu = eu_sums
        .into_iter()
        .filter_map(|(country, total)| {
            let rate = vat.rate(&country)?;
            Some((country, EuTotals::from_gross(total, rate)))
        })
        .collect();

    tracing::info!(
        eu_sales = eu_counts.total(),
        eu_countries = eu_counts.countries(),
        non_eu_sales = non_eu_counts.total(),
        non_eu_countries = non_eu_counts.countries(),
        "sales split by country"
    );

    SalesSplit {
        eu,
        non_eu,
        eu_counts,
        non_eu_counts,
    }
}

/// Non-EU country names that equal a VAT table key once whitespace and
/// ASCII case are ignored, paired with that key. These sales were not
/// treated as EU sales and probably should have been.
pub fn suspicious_countries<'a>(split: &'a SalesSplit, vat: &'a VatTable) -> Vec<(&'a str, &'a str)> {
    fn fold(s: &str) -> String {
        s.trim().to_ascii_lowercase()
    }
    let mut found = Vec::new();
    for country in split.non_eu_counts.0.keys() {
        let key = fold(country);
        if let Some((eu_country, _)) = vat.iter().find(|&(c, _)| fold(c) == key) {
            found.push((country.as_str(), eu_country));
        }
    }
    found
}
