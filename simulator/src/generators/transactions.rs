use crate::catalog::Catalog;
use crate::error::SimulationError;
use crate::generate::{GeneratedFile, Generator};
use crate::machine::Machine;
use crate::stock::{StockSettings, simulate_machine};
use rand::rngs::StdRng;
use std::path::Path;
use tracing::info;

/// Dispensing transactions of one cabinet.
pub struct TransactionsGenerator<'a> {
    pub machine: &'a Machine,
    pub catalog: &'a Catalog,
    pub settings: StockSettings,
}

impl Generator for TransactionsGenerator<'_> {
    fn generate(&self, out_dir: &Path, rng: &mut StdRng) -> Result<GeneratedFile, SimulationError> {
        let transactions = simulate_machine(self.machine, self.catalog, &self.settings, rng);

        let path = out_dir.join(self.machine.output_file);
        let mut writer = csv::Writer::from_path(&path)?;
        for transaction in &transactions {
            writer.serialize(transaction)?;
        }
        writer.flush()?;

        info!(
            machine = self.machine.id,
            transactions = transactions.len(),
            "wrote {}",
            path.display()
        );
        Ok(GeneratedFile {
            path,
            rows: transactions.len(),
        })
    }
}
