//! Automated dispensing cabinets and the departments they serve.

use crate::catalog::{Department, Medication, Rarity};
use serde::Serialize;

/// A transaction appended verbatim after the simulated ones.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedWithdrawal {
    pub medication: &'static str,
    pub remaining: u32,
}

#[derive(Debug, Clone)]
pub struct Machine {
    pub id: u32,
    /// Departments in the order they are listed in `Machines.csv`.
    pub departments: Vec<Department>,
    /// Departments whose rarity decides the stock model, highest priority first.
    pub rarity_priority: Vec<Department>,
    /// Rarity overrides for stocked medications.
    pub overrides: Vec<(&'static str, Rarity)>,
    pub fixed: Vec<FixedWithdrawal>,
    pub output_file: &'static str,
}

impl Machine {
    /// The three cabinets of the stock-out exercise.
    pub fn standard() -> Vec<Machine> {
        use Department::*;
        vec![
            Machine {
                id: 1,
                departments: vec![Emergency],
                rarity_priority: vec![Emergency],
                overrides: vec![
                    ("ibuprofen 200mg TAB", Rarity::SpecialLow),
                    ("ibuprofen 400mg TAB", Rarity::SpecialLow),
                    ("furosemide 40mg TAB", Rarity::SpecialLow),
                    ("metoprolol succinate ER 25mg TAB", Rarity::SpecialHigh),
                    ("metoprolol tartrate 25mg TAB", Rarity::SpecialHigh),
                ],
                // Never dispensed from this cabinet except once.
                fixed: vec![FixedWithdrawal {
                    medication: "pravastatin 10mg TAB",
                    remaining: 14,
                }],
                output_file: "EmergencyDepartmentTransactions.csv",
            },
            Machine {
                id: 2,
                departments: vec![Surgery, Neurology],
                rarity_priority: vec![Surgery, Neurology],
                overrides: vec![
                    ("DAPTomycin PFI 50mg/1mL 10mL INJ", Rarity::SpecialLow),
                    ("enoxaparin 120mg/0.8mL 0.8mL SYRINGE", Rarity::SpecialLow),
                    ("acetaZOLAMIDE 125mg TAB", Rarity::SpecialHigh),
                    ("acetaZOLAMIDE 250mg TAB", Rarity::SpecialHigh),
                    ("EPINEPHrine 0.3mg/0.3mL 0.3mL PEN", Rarity::SpecialHigh),
                    ("enoxaparin 60mg/0.6mL 0.6mL SYRINGE", Rarity::SpecialHigh),
                    ("enoxaparin 80mg/0.8mL 0.8mL SYRINGE", Rarity::SpecialHigh),
                ],
                fixed: Vec::new(),
                output_file: "Neuro_Surgery_Transactions.csv",
            },
            Machine {
                id: 3,
                departments: vec![Dermatology, Oncology],
                rarity_priority: vec![Oncology, Dermatology],
                overrides: vec![
                    ("levothyroxine 100mcg TAB", Rarity::SpecialHigh),
                    ("furosemide 40mg TAB", Rarity::SpecialLow),
                ],
                fixed: Vec::new(),
                output_file: "Onc_Derm_Transactions.csv",
            },
        ]
    }

    /// The rarity this cabinet stocks `medication` at, or `None` when it does not stock it.
    pub fn rarity_of(&self, medication: &Medication) -> Option<Rarity> {
        let base = self
            .rarity_priority
            .iter()
            .map(|d| medication.rarity_in(*d))
            .find(|r| r.is_stocked())?;
        let rarity = self
            .overrides
            .iter()
            .find(|(name, _)| *name == medication.name)
            .map(|(_, r)| *r)
            .unwrap_or(base);
        Some(rarity)
    }
}

#[derive(Debug, Serialize)]
pub struct MachineRow {
    #[serde(rename = "Machine ID")]
    pub machine: u32,
    #[serde(rename = "Department/Location")]
    pub department: &'static str,
}

/// One row per (machine, department) pair.
pub fn machine_rows(machines: &[Machine]) -> Vec<MachineRow> {
    machines
        .iter()
        .flat_map(|m| {
            m.departments.iter().map(move |d| MachineRow {
                machine: m.id,
                department: d.display_name(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn standard_layout_has_five_department_rows() {
        let rows = machine_rows(&Machine::standard());
        let pairs: Vec<_> = rows.iter().map(|r| (r.machine, r.department)).collect();
        assert_eq!(
            pairs,
            vec![
                (1, "Emergency Department"),
                (2, "Surgery"),
                (2, "Neurology"),
                (3, "Dermatology"),
                (3, "Oncology"),
            ]
        );
    }

    #[test]
    fn overrides_apply_only_to_stocked_medications() {
        let catalog = Catalog::builtin();
        let machines = Machine::standard();
        let ed = &machines[0];

        let ibuprofen = catalog.get("ibuprofen 200mg TAB").unwrap();
        assert_eq!(ed.rarity_of(ibuprofen), Some(Rarity::SpecialLow));

        let pravastatin = catalog.get("pravastatin 10mg TAB").unwrap();
        assert_eq!(ed.rarity_of(pravastatin), None);
    }

    #[test]
    fn first_stocking_department_wins() {
        let catalog = Catalog::builtin();
        let machines = Machine::standard();
        // Oncology is consulted before Dermatology on machine 3.
        let hydrocortisone = catalog.get("hydrocortisone 10mg TAB").unwrap();
        assert_eq!(machines[2].rarity_of(hydrocortisone), Some(Rarity::Rare));
        let levothyroxine = catalog.get("levothyroxine 50mcg TAB").unwrap();
        assert_eq!(machines[2].rarity_of(levothyroxine), Some(Rarity::Moderate));
    }
}
