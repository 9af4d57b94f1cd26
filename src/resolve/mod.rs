//! Maps semantic field roles onto the column labels a particular file uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{ColumnMapping, FieldRole};

/// Prioritized synonyms per role. Earlier entries win when a table carries
/// more than one accepted variant.
///
/// When deserialized, the roles that are present replace the built-in lists
/// and the others keep them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<FieldRole, Vec<String>>",
    into = "BTreeMap<FieldRole, Vec<String>>"
)]
pub struct SynonymTable {
    entries: BTreeMap<FieldRole, Vec<String>>,
}

impl SynonymTable {
    /// Synonyms for `role` in priority order.
    pub fn synonyms(&self, role: FieldRole) -> &[String] {
        self.entries.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves every role against `labels`. For each role the first synonym
    /// that equals a label (ignoring case and surrounding whitespace) wins;
    /// when several labels match that synonym the leftmost one is used.
    pub fn resolve<'a, I>(&self, labels: I) -> ColumnMapping
    where
        I: IntoIterator<Item = &'a str>,
    {
        let labels = normalized(labels);
        let mut mapping = ColumnMapping::default();
        for (role, synonyms) in &self.entries {
            if let Some(label) = first_match(synonyms, &labels) {
                mapping.insert(*role, label.to_string());
            }
        }
        mapping
    }

    /// Resolves a single role.
    pub fn resolve_role<'a, I>(&self, role: FieldRole, labels: I) -> Option<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        first_match(self.synonyms(role), &normalized(labels)).map(str::to_string)
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let table: [(FieldRole, &[&str]); 8] = [
            (FieldRole::Party, &["PARTY", "PARTY NAME", "PARTYA1", "CUSTOMER"]),
            (FieldRole::Material, &["MATERIAL", "ITEM", "PRODUCT"]),
            (
                FieldRole::Quantity,
                &["QTY", "QUANTITY", "APPROX QTY", "APROX QTY"],
            ),
            (
                FieldRole::Rate,
                &["RATE", "RATE / KG", "RATE/KG", "RATE PER KG"],
            ),
            (
                FieldRole::Vehicle,
                &["VEHICLE NO", "VEHICLE", "VEHICLE NUMBER"],
            ),
            (FieldRole::Date, &["LOADING DATE", "DATE"]),
            (FieldRole::Group, &["GODOWN", "LOCATION", "WAREHOUSE"]),
            (FieldRole::Status, &["STATUS", "PAYMENT"]),
        ];

        let entries = table
            .into_iter()
            .map(|(role, synonyms)| {
                (
                    role,
                    synonyms.iter().map(|synonym| synonym.to_string()).collect(),
                )
            })
            .collect();
        Self { entries }
    }
}

impl From<BTreeMap<FieldRole, Vec<String>>> for SynonymTable {
    fn from(overrides: BTreeMap<FieldRole, Vec<String>>) -> Self {
        let mut table = SynonymTable::default();
        table.entries.extend(overrides);
        table
    }
}

impl From<SynonymTable> for BTreeMap<FieldRole, Vec<String>> {
    fn from(table: SynonymTable) -> Self {
        table.entries
    }
}

fn normalized<'a, I>(labels: I) -> Vec<(&'a str, String)>
where
    I: IntoIterator<Item = &'a str>,
{
    labels
        .into_iter()
        .map(|label| (label, normalize_label(label)))
        .collect()
}

fn first_match<'a>(synonyms: &[String], labels: &[(&'a str, String)]) -> Option<&'a str> {
    synonyms.iter().find_map(|synonym| {
        let wanted = normalize_label(synonym);
        labels
            .iter()
            .find(|(_, normalized)| *normalized == wanted)
            .map(|(label, _)| *label)
    })
}

fn normalize_label(label: &str) -> String {
    label.trim().to_uppercase()
}
