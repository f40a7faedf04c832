//! Synthetic dispensing-cabinet data for the stock-out exercise.
//!
//! A [`Simulation`] writes `MEDICATIONS.csv`, `Machines.csv` and one transactions
//! file per cabinet. All randomness comes from a single generator seeded once, so
//! the same seed and catalog always produce the same files.

pub mod catalog;
pub mod error;
pub mod generate;
pub mod generators;
pub mod machine;
pub mod stock;

use crate::catalog::Catalog;
use crate::error::SimulationError;
use crate::generate::{GeneratedFile, Generator, run_generator};
use crate::generators::{
    machines::MachinesGenerator, medications::MedicationsGenerator,
    transactions::TransactionsGenerator,
};
use crate::machine::Machine;
use crate::stock::StockSettings;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::Path;
use tracing::info;

pub struct Simulation {
    catalog: Catalog,
    machines: Vec<Machine>,
    seed: u64,
}

impl Simulation {
    pub fn new(catalog: Catalog, seed: u64) -> Self {
        Self {
            catalog,
            machines: Machine::standard(),
            seed,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn machines(&self) -> &[Machine] {
        &self.machines
    }

    /// Write every output file into `out_dir`, creating it when missing.
    pub fn run(&self, out_dir: &Path) -> Result<Vec<GeneratedFile>, SimulationError> {
        util::paths::ensure_dir(out_dir)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let settings = StockSettings::draw(&mut rng);
        info!(
            seed = self.seed,
            special_high = settings.special_high_units,
            special_low = settings.special_low_units,
            "starting simulation"
        );

        let mut generators: Vec<(Box<dyn Generator + '_>, String)> = vec![
            (
                Box::new(MedicationsGenerator {
                    catalog: &self.catalog,
                }) as Box<dyn Generator + '_>,
                "Medications".to_string(),
            ),
            (
                Box::new(MachinesGenerator {
                    machines: &self.machines,
                }) as Box<dyn Generator + '_>,
                "Machines".to_string(),
            ),
        ];
        for machine in &self.machines {
            let generator = TransactionsGenerator {
                machine,
                catalog: &self.catalog,
                settings,
            };
            generators.push((
                Box::new(generator) as Box<dyn Generator + '_>,
                format!("Machine {} transactions", machine.id),
            ));
        }

        let mut files = Vec::with_capacity(generators.len());
        for (generator, name) in &generators {
            files.push(run_generator(generator.as_ref(), name, out_dir, &mut rng)?);
        }
        Ok(files)
    }
}
