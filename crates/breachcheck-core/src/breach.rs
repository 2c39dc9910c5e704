//! Breach records: metadata about each disclosed incident

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

/// Catalog identifier, assigned sequentially from 1.
pub type BreachId = u32;

/// A breach as stored in the catalog. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreachRecord {
    pub id: BreachId,
    pub name: String,
    pub title: String,
    pub domain: Option<String>,
    /// `YYYY-MM` or `YYYY-MM-DD`
    pub breach_date: String,
    pub added_date: String,
    pub modified_date: Option<String>,
    /// Number of accounts affected
    pub pwn_count: u64,
    pub description: String,
    pub logo_path: Option<String>,
    /// e.g. "Email addresses", "Passwords"
    pub data_classes: Vec<String>,
    pub is_verified: bool,
    pub is_fabricated: bool,
    pub is_sensitive: bool,
    pub is_retired: bool,
    pub is_spam_list: bool,
}

impl BreachRecord {
    /// Validate `new` and build the record under `id`.
    pub fn assign(id: BreachId, new: NewBreach) -> Result<Self> {
        new.validate()?;

        Ok(Self {
            id,
            name: required(new.name, "name")?,
            title: required(new.title, "title")?,
            domain: new.domain,
            breach_date: required(new.breach_date, "breachDate")?,
            added_date: required(new.added_date, "addedDate")?,
            modified_date: new.modified_date,
            pwn_count: new.pwn_count.ok_or(Error::MissingField("pwnCount"))?,
            description: required(new.description, "description")?,
            logo_path: new.logo_path,
            data_classes: new.data_classes.ok_or(Error::MissingField("dataClasses"))?,
            is_verified: new.is_verified.unwrap_or(true),
            is_fabricated: new.is_fabricated.unwrap_or(false),
            is_sensitive: new.is_sensitive.unwrap_or(false),
            is_retired: new.is_retired.unwrap_or(false),
            is_spam_list: new.is_spam_list.unwrap_or(false),
        })
    }

    /// Whether the breach exposed the given data class (case-insensitive).
    pub fn exposes(&self, data_class: &str) -> bool {
        self.data_classes
            .iter()
            .any(|c| c.eq_ignore_ascii_case(data_class))
    }
}

/// A breach submitted for insertion: every field except the id.
///
/// Fields are optional at the serde layer so that a missing required field
/// surfaces as [`Error::MissingField`] rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBreach {
    pub name: Option<String>,
    pub title: Option<String>,
    pub domain: Option<String>,
    pub breach_date: Option<String>,
    pub added_date: Option<String>,
    pub modified_date: Option<String>,
    pub pwn_count: Option<u64>,
    pub description: Option<String>,
    pub logo_path: Option<String>,
    pub data_classes: Option<Vec<String>>,
    pub is_verified: Option<bool>,
    pub is_fabricated: Option<bool>,
    pub is_sensitive: Option<bool>,
    pub is_retired: Option<bool>,
    pub is_spam_list: Option<bool>,
}

impl From<BreachRecord> for NewBreach {
    fn from(record: BreachRecord) -> Self {
        Self {
            name: Some(record.name),
            title: Some(record.title),
            domain: record.domain,
            breach_date: Some(record.breach_date),
            added_date: Some(record.added_date),
            modified_date: record.modified_date,
            pwn_count: Some(record.pwn_count),
            description: Some(record.description),
            logo_path: record.logo_path,
            data_classes: Some(record.data_classes),
            is_verified: Some(record.is_verified),
            is_fabricated: Some(record.is_fabricated),
            is_sensitive: Some(record.is_sensitive),
            is_retired: Some(record.is_retired),
            is_spam_list: Some(record.is_spam_list),
        }
    }
}

impl NewBreach {
    /// Check required fields and date shapes without consuming the draft.
    pub fn validate(&self) -> Result<()> {
        check_present(&self.name, "name")?;
        check_present(&self.title, "title")?;
        check_present(&self.description, "description")?;

        let breach_date = check_present(&self.breach_date, "breachDate")?;
        check_date("breachDate", breach_date)?;

        let added_date = check_present(&self.added_date, "addedDate")?;
        check_date("addedDate", added_date)?;

        if let Some(modified) = self.modified_date.as_deref() {
            check_date("modifiedDate", modified)?;
        }

        if self.pwn_count.is_none() {
            return Err(Error::MissingField("pwnCount"));
        }
        if self.data_classes.is_none() {
            return Err(Error::MissingField("dataClasses"));
        }

        Ok(())
    }
}

fn check_present<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::MissingField(field)),
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value.ok_or(Error::MissingField(field))
}

/// Accepts a full date (`2013-12-04`) or a year-month (`2013-10`).
fn check_date(field: &'static str, value: &str) -> Result<()> {
    let full = NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();
    let year_month =
        value.len() == 7 && NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok();

    if full || year_month {
        Ok(())
    } else {
        Err(Error::InvalidDate {
            field,
            value: value.to_string(),
        })
    }
}
