//! Stock model: withdrawals draw a cabinet pocket down, an empty pocket is refilled
//! and counted as a stock-out, and each medication runs until it has stocked out a
//! rarity-dependent number of times.

use crate::catalog::{Catalog, Rarity};
use crate::machine::Machine;
use chrono::{Days, NaiveDate};
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ID_LENGTH: usize = 12;
const DAYS_IN_PERIOD: f64 = 365.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransactionType {
    Withdrawal,
    Refill,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    #[serde(rename = "TransactionID")]
    pub id: String,
    #[serde(rename = "Machine")]
    pub machine: u32,
    #[serde(rename = "Day")]
    pub day: NaiveDate,
    #[serde(rename = "Medication")]
    pub medication: String,
    #[serde(rename = "Type")]
    pub kind: TransactionType,
    #[serde(rename = "AmtRemaining")]
    pub remaining: u32,
}

/// Initial units per rarity, drawn once per simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockSettings {
    pub special_high_units: u32,
    pub special_low_units: u32,
}

impl StockSettings {
    pub fn draw<R: Rng>(rng: &mut R) -> Self {
        Self {
            special_high_units: rng.gen_range(30..45),
            // Rarely dispensed, but still stocked generously.
            special_low_units: rng.gen_range(30..45),
        }
    }

    pub fn initial_units(&self, rarity: Rarity) -> u32 {
        match rarity {
            Rarity::SpecialHigh => self.special_high_units,
            Rarity::Common => 30,
            Rarity::Moderate => 20,
            Rarity::Rare => 10,
            Rarity::SpecialLow => self.special_low_units,
            Rarity::None => 0,
        }
    }
}

/// Range the number of stock-outs per medication is drawn from.
pub fn stockout_range(rarity: Rarity) -> Range<u32> {
    match rarity {
        Rarity::SpecialLow => 2..8,
        Rarity::Rare => 10..30,
        Rarity::Moderate => 25..50,
        Rarity::Common => 65..105,
        Rarity::SpecialHigh => 150..200,
        Rarity::None => 0..1,
    }
}

pub fn transaction_id<R: Rng>(rng: &mut R) -> String {
    (0..ID_LENGTH)
        .map(|_| char::from(ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())]))
        .collect()
}

fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Simulate every medication `machine` stocks, then append its fixed withdrawals.
/// Days are assigned afterwards by [`assign_days`].
pub fn simulate_machine<R: Rng>(
    machine: &Machine,
    catalog: &Catalog,
    settings: &StockSettings,
    rng: &mut R,
) -> Vec<Transaction> {
    let mut transactions = Vec::new();
    let mut record = |rng: &mut R, medication: &str, kind, remaining| {
        transactions.push(Transaction {
            id: transaction_id(rng),
            machine: machine.id,
            day: start_date(),
            medication: medication.to_string(),
            kind,
            remaining,
        });
    };

    for medication in catalog.medications() {
        let Some(rarity) = machine.rarity_of(medication) else {
            continue;
        };
        let init = settings.initial_units(rarity);
        let mut remaining = init.saturating_sub(1);
        record(&mut *rng, &medication.name, TransactionType::Withdrawal, remaining);

        let limit = rng.gen_range(stockout_range(rarity));
        let mut stockouts = 0;
        while stockouts <= limit {
            if remaining > 0 {
                remaining = remaining.saturating_sub(rng.gen_range(1..=3));
                record(&mut *rng, &medication.name, TransactionType::Withdrawal, remaining);
            } else {
                remaining = init;
                record(&mut *rng, &medication.name, TransactionType::Refill, remaining);
                stockouts += 1;
            }
        }
        debug!(machine = machine.id, medication = %medication.name, ?rarity, stockouts, "simulated");
    }

    for fixed in &machine.fixed {
        record(&mut *rng, fixed.medication, TransactionType::Withdrawal, fixed.remaining);
    }

    assign_days(&mut transactions);
    transactions
}

/// Spread each medication's transactions over the year: the n-th of N falls on
/// `2020-01-01 + round(365 * n / N)` days, halves rounding to even.
pub fn assign_days(transactions: &mut [Transaction]) {
    let mut totals: HashMap<String, u32> = HashMap::new();
    for t in transactions.iter() {
        *totals.entry(t.medication.clone()).or_default() += 1;
    }

    let mut seen: HashMap<String, u32> = HashMap::new();
    let start = start_date();
    for t in transactions.iter_mut() {
        let n = seen.entry(t.medication.clone()).or_default();
        *n += 1;
        let total = totals.get(&t.medication).copied().unwrap_or(1);
        let offset = (DAYS_IN_PERIOD * f64::from(*n) / f64::from(total)).round_ties_even();
        t.day = start
            .checked_add_days(Days::new(offset as u64))
            .unwrap_or(start);
    }
}
