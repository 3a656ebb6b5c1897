use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::columns::{col_to_ind, SalesColumns};
use crate::error::{Result, SalesError};
use crate::vat::VatTable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub columns: RequiredColumns,
    #[serde(default = "default_start_row")]
    pub start_row: usize,
    #[serde(default)]
    pub files: FileNames,
    #[serde(default)]
    pub template: TemplateLayout,
    #[serde(default)]
    pub vat: VatTable,
}

fn default_start_row() -> usize {
    2
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            columns: RequiredColumns::default(),
            start_row: default_start_row(),
            files: FileNames::default(),
            template: TemplateLayout::default(),
            vat: VatTable::default(),
        }
    }
}

/// Columns of the sales export holding the sale date, ship country and order total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredColumns {
    pub date: String,
    pub country: String,
    pub total: String,
}

impl Default for RequiredColumns {
    fn default() -> Self {
        Self {
            date: "A".to_string(),
            country: "O".to_string(),
            total: "X".to_string(),
        }
    }
}

impl RequiredColumns {
    pub fn resolve(&self) -> Result<SalesColumns> {
        SalesColumns::parse(&self.date, &self.country, &self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNames {
    pub template: String,
    pub sales_output: String,
    pub template_output: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            template: config_dir().join("template.xlsx").to_string_lossy().to_string(),
            sales_output: "pardavimai_".to_string(),
            template_output: "b1_import_".to_string(),
        }
    }
}

impl FileNames {
    pub fn sales_file(&self, year: i32, month: u32) -> String {
        format!("{}{year}-{month}.xlsx", self.sales_output)
    }

    pub fn template_file(&self, year: i32, month: u32) -> String {
        format!("{}{year}-{month}.xlsx", self.template_output)
    }
}

/// A fixed value written into every filled template row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Number(f64),
    Text(String),
}

/// Where each sale lands in the accounting import template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariables {
    pub date: String,
    pub number: String,
    pub country: String,
    pub price: String,
}

impl Default for TemplateVariables {
    fn default() -> Self {
        Self {
            date: "A".to_string(),
            number: "D".to_string(),
            country: "L".to_string(),
            price: "W".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLayout {
    #[serde(default)]
    pub variables: TemplateVariables,
    #[serde(default = "default_constants")]
    pub constants: BTreeMap<String, TemplateValue>,
}

fn default_constants() -> BTreeMap<String, TemplateValue> {
    let text = |s: &str| TemplateValue::Text(s.to_string());
    BTreeMap::from([
        ("C".to_string(), text("SF")),
        ("E".to_string(), text("Pardavimai")),
        ("F".to_string(), text("EUR")),
        ("G".to_string(), text("")),
        ("N".to_string(), text("")),
        ("R".to_string(), text("Pagrindinis")),
        ("S".to_string(), text("Pardavimas, linas")),
        ("V".to_string(), TemplateValue::Number(1.0)),
        ("Y".to_string(), TemplateValue::Number(0.0)),
        ("Z".to_string(), text("PVM12")),
        ("AA".to_string(), TemplateValue::Number(50001.0)),
    ])
}

impl Default for TemplateLayout {
    fn default() -> Self {
        Self {
            variables: TemplateVariables::default(),
            constants: default_constants(),
        }
    }
}

impl Settings {
    /// Check every column address and VAT rate before any file is touched.
    pub fn validate(&self) -> Result<()> {
        self.columns.resolve()?;
        let vars = &self.template.variables;
        for label in [&vars.date, &vars.number, &vars.country, &vars.price] {
            col_to_ind(label, 0)?;
        }
        for label in self.template.constants.keys() {
            col_to_ind(label, 0)?;
        }
        if self.start_row == 0 {
            return Err(SalesError::Settings("start_row must be 1 or greater".to_string()));
        }
        if let Some((country, rate)) = self.vat.invalid_rates().first() {
            return Err(SalesError::Settings(format!(
                "VAT rate for {country} must be a non-negative number, got {rate}"
            )));
        }
        Ok(())
    }
}

pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("salesplit")
}

pub fn default_settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Load settings from `path`, falling back to defaults when the file does not exist.
pub fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(|e| SalesError::Settings(format!("{}: {e}", path.display())))?;
    Ok(settings)
}

pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.columns.total = "Y".to_string();
        settings.start_row = 3;
        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(&path).unwrap();
        assert_eq!(loaded.columns.total, "Y");
        assert_eq!(loaded.start_row, 3);
        assert_eq!(loaded.vat, VatTable::default());
        assert_eq!(loaded.template, TemplateLayout::default());
    }

    #[test]
    fn test_load_returns_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let s = load_settings(&dir.path().join("nope.json")).unwrap();
        assert_eq!(s.columns, RequiredColumns::default());
        assert_eq!(s.start_row, 2);
        assert_eq!(s.files.sales_output, "pardavimai_");
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"columns": {"date": "B", "country": "C", "total": "D"}, "vat": {"Lithuania": 21}}"#,
        )
        .unwrap();
        let s = load_settings(&path).unwrap();
        assert_eq!(s.columns.date, "B");
        assert_eq!(s.vat.rate("Lithuania"), Some(21.0));
        assert_eq!(s.vat.rate("Germany"), None);
        assert_eq!(s.template.variables.price, "W");
        assert_eq!(s.template.constants["AA"], TemplateValue::Number(50001.0));
    }

    #[test]
    fn test_load_reports_broken_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_settings(&path), Err(SalesError::Settings(_))));
    }

    #[test]
    fn test_save_creates_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("settings.json");
        save_settings(&Settings::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_validate() {
        assert!(Settings::default().validate().is_ok());

        let mut s = Settings::default();
        s.columns.country = "1".to_string();
        assert!(matches!(s.validate(), Err(SalesError::InvalidColumn(_))));

        let mut s = Settings::default();
        s.template.constants.insert("A-".to_string(), TemplateValue::Number(1.0));
        assert!(s.validate().is_err());

        let mut s = Settings::default();
        s.vat = [("Nowhere".to_string(), -5.0)].into_iter().collect();
        assert!(matches!(s.validate(), Err(SalesError::Settings(_))));
    }

    #[test]
    fn test_output_file_names() {
        let files = FileNames::default();
        assert_eq!(files.sales_file(2024, 3), "pardavimai_2024-3.xlsx");
        assert_eq!(files.template_file(2024, 12), "b1_import_2024-12.xlsx");
    }

    #[test]
    fn test_template_values_untagged() {
        let v: BTreeMap<String, TemplateValue> =
            serde_json::from_str(r#"{"C": "SF", "V": 1.0, "AA": 50001}"#).unwrap();
        assert_eq!(v["C"], TemplateValue::Text("SF".into()));
        assert_eq!(v["V"], TemplateValue::Number(1.0));
        assert_eq!(v["AA"], TemplateValue::Number(50001.0));
    }
}
