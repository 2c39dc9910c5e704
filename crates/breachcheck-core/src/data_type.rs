//! Kind of hashed identifier held in the membership index

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Email,
    Phone,
}

impl DataType {
    pub const ALL: [DataType; 2] = [DataType::Email, DataType::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Email => "email",
            DataType::Phone => "phone",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(DataType::Email),
            "phone" => Ok(DataType::Phone),
            other => Err(Error::UnknownDataType(other.to_string())),
        }
    }
}
