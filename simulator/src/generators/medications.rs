use crate::catalog::Catalog;
use crate::error::SimulationError;
use crate::generate::{GeneratedFile, Generator};
use rand::rngs::StdRng;
use std::path::Path;

pub struct MedicationsGenerator<'a> {
    pub catalog: &'a Catalog,
}

impl Generator for MedicationsGenerator<'_> {
    fn generate(&self, out_dir: &Path, _rng: &mut StdRng) -> Result<GeneratedFile, SimulationError> {
        let path = out_dir.join("MEDICATIONS.csv");
        self.catalog.write_csv(&path)?;
        Ok(GeneratedFile {
            path,
            rows: self.catalog.len(),
        })
    }
}
