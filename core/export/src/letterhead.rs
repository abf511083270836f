//! FILENAME: core/export/src/letterhead.rs
//! PURPOSE: The identity block and optional expenses side-table that precede
//! every exported table.

use serde::{Deserialize, Serialize};

/// Organization and account identity printed at the top of every artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Letterhead {
    pub organization: String,
    pub client_name: String,
    pub client_id: String,
}

impl Letterhead {
    pub fn new(
        organization: impl Into<String>,
        client_name: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Letterhead {
            organization: organization.into(),
            client_name: client_name.into(),
            client_id: client_id.into(),
        }
    }

    pub fn title_line(&self) -> &str {
        &self.organization
    }

    pub fn identity_line(&self) -> String {
        format!("Name: {} / Client ID: {}", self.client_name, self.client_id)
    }
}

/// One charge in the expenses side-table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseLine {
    pub label: String,
    pub amount: f64,
}

impl ExpenseLine {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        ExpenseLine {
            label: label.into(),
            amount,
        }
    }
}

/// Expenses preamble: labelled amounts and a total already rounded by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expenses {
    pub lines: Vec<ExpenseLine>,
    pub total: f64,
}

impl Expenses {
    pub fn new(lines: Vec<ExpenseLine>, total: f64) -> Self {
        Expenses { lines, total }
    }

    /// Sum the lines and round the total to `decimal_places`.
    pub fn summed(lines: Vec<ExpenseLine>, decimal_places: u8) -> Self {
        let factor = 10f64.powi(decimal_places as i32);
        let sum: f64 = lines.iter().map(|line| line.amount).sum();
        Expenses {
            lines,
            total: (sum * factor).round() / factor,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
