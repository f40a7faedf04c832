//! Medication catalog: every medication the dispensing cabinets can stock, with
//! its dispensing rarity in each department.
//!
//! The catalog is read from a CSV file (`Med_Name`, `Note`, `EmergencyStatus` and
//! one `<Department>_Rarity` column per department) or taken from the built-in list.

use crate::error::SimulationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Department {
    Emergency,
    Surgery,
    Neurology,
    Dermatology,
    Oncology,
}

impl Department {
    /// Name written to `Machines.csv`.
    pub fn display_name(self) -> &'static str {
        match self {
            Department::Emergency => "Emergency Department",
            Department::Surgery => "Surgery",
            Department::Neurology => "Neurology",
            Department::Dermatology => "Dermatology",
            Department::Oncology => "Oncology",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How often a medication is dispensed in a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    /// Not stocked.
    None,
    SpecialLow,
    Rare,
    Moderate,
    Common,
    SpecialHigh,
}

impl Rarity {
    pub fn is_stocked(self) -> bool {
        self != Rarity::None
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "None" => Ok(Rarity::None),
            "SpecialLow" => Ok(Rarity::SpecialLow),
            "Rare" => Ok(Rarity::Rare),
            "Moderate" => Ok(Rarity::Moderate),
            "Common" => Ok(Rarity::Common),
            "SpecialHigh" => Ok(Rarity::SpecialHigh),
            other => Err(format!("unknown rarity `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Medication {
    pub name: String,
    pub note: String,
    pub emergency_status: String,
    rarity: [Rarity; 5],
}

impl Medication {
    pub fn rarity_in(&self, department: Department) -> Rarity {
        self.rarity[department.index()]
    }

    pub fn is_emergency(&self) -> bool {
        self.emergency_status.eq_ignore_ascii_case("yes")
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    #[serde(rename = "Med_Name")]
    name: String,
    #[serde(rename = "Note", default)]
    note: String,
    #[serde(rename = "EmergencyStatus", default)]
    emergency_status: String,
    #[serde(rename = "ED_Rarity", default)]
    ed: String,
    #[serde(rename = "GenSurgery_Rarity", default)]
    surgery: String,
    #[serde(rename = "Neurology_Rarity", default)]
    neurology: String,
    #[serde(rename = "Dermatology_Rarity", default)]
    dermatology: String,
    #[serde(rename = "Oncology_Rarity", default)]
    oncology: String,
}

#[derive(Debug, Serialize)]
struct MedicationRow<'a> {
    #[serde(rename = "Med_Name")]
    name: &'a str,
    #[serde(rename = "Note")]
    note: &'a str,
    #[serde(rename = "EmergencyStatus")]
    emergency_status: &'a str,
}

/// Medications sorted by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    medications: Vec<Medication>,
}

impl Catalog {
    fn from_medications(mut medications: Vec<Medication>) -> Self {
        medications.sort_by(|a, b| a.name.cmp(&b.name));
        Self { medications }
    }

    pub fn from_csv(path: &Path) -> Result<Self, SimulationError> {
        let invalid = |reason: String| SimulationError::Catalog {
            path: path.to_path_buf(),
            reason,
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let mut medications = Vec::new();
        for record in reader.deserialize::<CatalogRecord>() {
            let record = record?;
            if record.name.trim().is_empty() {
                continue;
            }
            let mut rarity = [Rarity::None; 5];
            for (slot, raw) in rarity.iter_mut().zip([
                &record.ed,
                &record.surgery,
                &record.neurology,
                &record.dermatology,
                &record.oncology,
            ]) {
                *slot = raw
                    .parse()
                    .map_err(|e| invalid(format!("{}: {e}", record.name)))?;
            }
            medications.push(Medication {
                name: record.name.trim().to_string(),
                note: record.note,
                emergency_status: record.emergency_status,
                rarity,
            });
        }

        if medications.is_empty() {
            return Err(invalid("no medications".to_string()));
        }
        Ok(Self::from_medications(medications))
    }

    pub fn builtin() -> Self {
        Self::from_medications(
            BUILTIN
                .iter()
                .map(|(name, note, emergency, rarity)| Medication {
                    name: name.to_string(),
                    note: note.to_string(),
                    emergency_status: emergency.to_string(),
                    rarity: *rarity,
                })
                .collect(),
        )
    }

    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn get(&self, name: &str) -> Option<&Medication> {
        self.medications.iter().find(|m| m.name == name)
    }

    pub fn len(&self) -> usize {
        self.medications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.medications.is_empty()
    }

    /// Write `Med_Name, Note, EmergencyStatus` for every medication.
    pub fn write_csv(&self, path: &Path) -> Result<(), SimulationError> {
        let mut writer = csv::Writer::from_path(path)?;
        for med in &self.medications {
            writer.serialize(MedicationRow {
                name: &med.name,
                note: &med.note,
                emergency_status: &med.emergency_status,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

use Rarity::{Common as C, Moderate as M, None as N, Rare as R};

// Rarity columns: Emergency, Surgery, Neurology, Dermatology, Oncology.
const BUILTIN: &[(&str, &str, &str, [Rarity; 5])] = &[
    ("acetaminophen 325mg TAB", "", "No", [C, C, M, M, C]),
    ("acetaZOLAMIDE 125mg TAB", "", "No", [N, M, R, N, N]),
    ("acetaZOLAMIDE 250mg TAB", "", "No", [N, R, M, N, N]),
    ("DAPTomycin PFI 50mg/1mL 10mL INJ", "Reconstitute before use", "Yes", [N, R, N, N, R]),
    ("DOPamine in D5W 800mcg/1mL 250mL INJ", "", "Yes", [M, R, N, N, N]),
    ("enoxaparin 120mg/0.8mL 0.8mL SYRINGE", "", "No", [N, R, R, N, R]),
    ("enoxaparin 60mg/0.6mL 0.6mL SYRINGE", "", "No", [R, M, M, N, M]),
    ("enoxaparin 80mg/0.8mL 0.8mL SYRINGE", "", "No", [R, M, R, N, M]),
    ("EPINEPHrine 0.3mg/0.3mL 0.3mL PEN", "", "Yes", [C, M, N, R, N]),
    ("furosemide 40mg TAB", "", "Yes", [R, N, N, R, R]),
    ("hydrocortisone 1% 1app CREAM", "Topical", "No", [R, N, N, C, M]),
    ("hydrocortisone 10mg TAB", "", "No", [M, N, N, M, R]),
    ("ibuprofen 200mg TAB", "", "No", [C, M, M, R, R]),
    ("ibuprofen 400mg TAB", "", "No", [M, M, R, N, R]),
    ("levothyroxine 100mcg TAB", "", "No", [N, N, N, M, M]),
    ("levothyroxine 50mcg TAB", "", "No", [N, N, N, R, M]),
    ("metoprolol succinate ER 25mg TAB", "", "No", [M, R, R, N, R]),
    ("metoprolol tartrate 25mg TAB", "", "No", [M, M, R, N, N]),
    ("ONDANsetron ODT 4mg TAB", "Dissolve on tongue", "No", [C, C, M, N, C]),
    ("pravastatin 10mg TAB", "", "No", [N, N, R, N, R]),
    ("pravastatin 20mg TAB", "", "No", [R, N, R, N, R]),
];
