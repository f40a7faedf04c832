use crate::error::SimulationError;
use crate::generate::{GeneratedFile, Generator};
use crate::machine::{Machine, machine_rows};
use rand::rngs::StdRng;
use std::path::Path;

pub struct MachinesGenerator<'a> {
    pub machines: &'a [Machine],
}

impl Generator for MachinesGenerator<'_> {
    fn generate(&self, out_dir: &Path, _rng: &mut StdRng) -> Result<GeneratedFile, SimulationError> {
        let path = out_dir.join("Machines.csv");
        let rows = machine_rows(self.machines);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in &rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(GeneratedFile {
            path,
            rows: rows.len(),
        })
    }
}
