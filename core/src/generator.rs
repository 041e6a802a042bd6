//! Synthetic snapshot generation.
//!
//! Produces a complete, referentially consistent snapshot from a master
//! seed. Each table draws from its own stream, so resizing one table
//! never changes the rows of another.
//!
//! GENERATION ORDER:
//!   1. States and cities   (reference geography, no randomness)
//!   2. Customers           (Customer stream)
//!   3. Loans               (Loan stream)
//!   4. Defaults            (Default stream)
//!   5. Economic indicators (Indicator stream)
//!   6. Data-quality faults (DataQuality stream): missing and short
//!      phones, missing default dates
//!
//! RULE: Fault injection runs last and on its own stream. Changing a
//! fault rate never changes the underlying clean rows.

use crate::{
    config::GeneratorConfig,
    domain::{City, CollectionStatus, Customer, DefaultCollection, EconomicIndicator, Loan, Region, State, Tier},
    error::{PipelineError, PipelineResult},
    name_generator::NameGenerator,
    reference::STATES,
    rng::{RngBank, StreamRng, StreamSlot},
    snapshot::Snapshot,
    types::{CustomerId, Quarter},
};
use chrono::{Datelike, Duration, NaiveDate};

const PROGRESS_EVERY: usize = 10_000;

const EMPLOYMENT_WEIGHTS: [(&str, f64); 5] = [
    ("Private Employee", 45.0),
    ("Government Employee", 20.0),
    ("Self Employed", 20.0),
    ("Business Owner", 10.0),
    ("Student", 5.0),
];

fn tier_weight(tier: &Tier) -> f64 {
    match tier {
        Tier::Tier1 => 0.45,
        Tier::Tier2 => 0.35,
        _ => 0.20,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Generate a full snapshot for `seed`.
pub fn generate_snapshot(seed: u64, config: &GeneratorConfig) -> PipelineResult<Snapshot> {
    config.validate()?;
    let bank = RngBank::new(seed);

    let (states, cities) = reference_geography();
    log::info!("generator: {} states, {} cities", states.len(), cities.len());

    let mut customers = generate_customers(&mut bank.for_stream(StreamSlot::Customer), config, &states, &cities)?;
    let loans = generate_loans(&mut bank.for_stream(StreamSlot::Loan), config, &customers);
    let mut defaults = generate_defaults(&mut bank.for_stream(StreamSlot::Default), config, &loans);
    let indicators = generate_indicators(&mut bank.for_stream(StreamSlot::Indicator), config, &states);

    inject_faults(
        &mut bank.for_stream(StreamSlot::DataQuality),
        config,
        &mut customers,
        &mut defaults,
    );

    let snapshot = Snapshot {
        states,
        cities,
        customers,
        loans,
        defaults,
        indicators,
    };
    log::info!("generator: seed {seed} produced {}", snapshot.fingerprint());
    Ok(snapshot)
}

/// States and cities from the reference list, ids in list order.
pub fn reference_geography() -> (Vec<State>, Vec<City>) {
    let mut states = Vec::with_capacity(STATES.len());
    let mut cities = Vec::new();
    for (i, s) in STATES.iter().enumerate() {
        let state_id = i as i64 + 1;
        states.push(State {
            state_id,
            state_name: s.name.to_string(),
            region: s.region.clone(),
        });
        for (name, tier) in s.cities {
            cities.push(City {
                city_id: cities.len() as i64 + 1,
                city_name: name.to_string(),
                state_id,
                tier_classification: tier.clone(),
            });
        }
    }
    (states, cities)
}

fn generate_customers(
    rng: &mut StreamRng,
    config: &GeneratorConfig,
    states: &[State],
    cities: &[City],
) -> PipelineResult<Vec<Customer>> {
    let weighted: Vec<(&City, f64)> = cities
        .iter()
        .map(|c| (c, tier_weight(&c.tier_classification)))
        .collect();
    let n = config.customers;
    let mut customers = Vec::with_capacity(n);

    for i in 0..n {
        let customer_id = i as CustomerId + 1;
        let city = *rng
            .pick_weighted(&weighted)
            .ok_or_else(|| PipelineError::Other(anyhow::anyhow!("no cities to place customers in")))?;
        let state_name = states
            .iter()
            .find(|s| s.state_id == city.state_id)
            .map(|s| s.state_name.as_str())
            .unwrap_or_default();

        let gender = NameGenerator::generate_gender(rng);
        let first = NameGenerator::generate_first_name(rng, gender);
        let last = NameGenerator::generate_last_name(rng);

        let age = rng.range_i64(18, 30) as i32;
        let date_of_birth = NaiveDate::from_ymd_opt(
            config.snapshot_date.year() - age,
            rng.range_i64(1, 12) as u32,
            rng.range_i64(1, 28) as u32,
        );

        let employment = *rng.pick_weighted(&EMPLOYMENT_WEIGHTS).unwrap_or(&"Private Employee");
        let base_income = match city.tier_classification {
            Tier::Tier1 => rng.range_f64(600_000.0, 1_800_000.0),
            Tier::Tier2 => rng.range_f64(400_000.0, 1_200_000.0),
            _ => rng.range_f64(250_000.0, 800_000.0),
        };
        let multiplier = match employment {
            "Government Employee" => rng.range_f64(0.8, 1.3),
            "Private Employee" => rng.range_f64(0.6, 1.6),
            "Business Owner" => rng.range_f64(1.0, 3.0),
            "Self Employed" => rng.range_f64(0.4, 2.0),
            _ => rng.range_f64(0.1, 0.4),
        };
        let annual_income = round2(base_income * multiplier);

        let cibil_base = match employment {
            "Government Employee" => rng.range_f64(650.0, 850.0),
            "Private Employee" => rng.range_f64(600.0, 800.0),
            _ => rng.range_f64(550.0, 750.0),
        };
        let bonus = if annual_income > 1_000_000.0 { 50.0 } else { 0.0 };
        let cibil_score = (cibil_base + bonus).clamp(300.0, 900.0) as i64;

        let phone = format!("+91{}", rng.range_i64(7_000_000_000, 9_999_999_999));
        let email = NameGenerator::email_for(first, last, customer_id, rng);
        let address = NameGenerator::generate_address(rng, &city.city_name, state_name);

        customers.push(Customer {
            customer_id,
            full_name: format!("{first} {last}"),
            phone_number: Some(phone),
            email_address: Some(email),
            city_id: city.city_id,
            current_address: Some(address),
            annual_income,
            cibil_score: Some(cibil_score),
            employment_type: employment.to_string(),
            gender: Some(gender.label().to_string()),
            date_of_birth,
        });

        if (i + 1) % PROGRESS_EVERY == 0 {
            log::info!("generator: {} / {n} customers", i + 1);
        }
    }
    Ok(customers)
}

/// 60% of loans go to single-loan customers, 25% to customers with two
/// and the rest to customers with three.
fn loan_owners(rng: &mut StreamRng, n: usize, customers: &[Customer]) -> Vec<CustomerId> {
    let single = n * 60 / 100;
    let double = n * 25 / 100;
    let triple = n - single - double;

    let mut owners = Vec::with_capacity(n);
    let draw = |rng: &mut StreamRng| customers[rng.index(customers.len())].customer_id;
    for _ in 0..single {
        owners.push(draw(rng));
    }
    for _ in 0..double / 2 {
        let id = draw(rng);
        owners.extend([id, id]);
    }
    for _ in 0..triple / 3 {
        let id = draw(rng);
        owners.extend([id, id, id]);
    }
    while owners.len() < n {
        owners.push(draw(rng));
    }

    // Fisher-Yates
    for i in (1..owners.len()).rev() {
        let j = rng.index(i + 1);
        owners.swap(i, j);
    }
    owners
}

fn generate_loans(rng: &mut StreamRng, config: &GeneratorConfig, customers: &[Customer]) -> Vec<Loan> {
    if customers.is_empty() {
        return Vec::new();
    }
    let cibil_by_customer: Vec<i64> = customers.iter().map(|c| c.cibil_score.unwrap_or(650)).collect();
    let owners = loan_owners(rng, config.loans, customers);

    let loans: Vec<Loan> = owners
        .into_iter()
        .enumerate()
        .map(|(i, customer_id)| {
            let loan_amount = round2(rng.range_f64(150_000.0, 800_000.0) + rng.range_f64(50_000.0, 250_000.0));
            let days_back = rng.range_i64(60, 1460) - rng.range_i64(7, 45);
            let disbursement_date = config.snapshot_date - Duration::days(days_back);

            let cibil = cibil_by_customer[(customer_id - 1) as usize];
            let default_prob = 0.08
                + if cibil < 600 {
                    0.15
                } else if cibil < 700 {
                    0.08
                } else {
                    0.0
                };
            let roll = rng.next_f64();
            let loan_status = if roll < default_prob {
                "Defaulted"
            } else if roll < default_prob + 0.06 {
                "Overdue"
            } else if days_back > 1200 {
                "Closed"
            } else {
                "Active"
            };

            Loan {
                loan_id: i as i64 + 1,
                customer_id,
                loan_amount,
                loan_status: loan_status.to_string(),
                disbursement_date: Some(disbursement_date),
            }
        })
        .collect();
    log::info!("generator: {} loans", loans.len());
    loans
}

/// Collection status from days overdue. Fresh defaults may be moved
/// into the in-progress or follow-up queues.
fn collection_status(rng: &mut StreamRng, config: &GeneratorConfig, days_overdue: i64) -> CollectionStatus {
    use CollectionStatus::*;
    let ladder = if days_overdue > 730 {
        vec![(WrittenOff, 50.0), (LegalAction, 30.0), (Settled, 20.0)]
    } else if days_overdue > 365 {
        vec![(LegalAction, 40.0), (Active, 35.0), (WrittenOff, 25.0)]
    } else if days_overdue > 180 {
        vec![(Active, 60.0), (LegalAction, 40.0)]
    } else {
        let roll = rng.next_f64();
        return if roll < config.in_progress_rate {
            InProgress
        } else if roll < config.in_progress_rate + config.follow_up_rate {
            FollowUpRequired
        } else {
            Active
        };
    };
    rng.pick_weighted(&ladder).cloned().unwrap_or(Active)
}

/// Share of the defaulted amount already recovered, by status.
fn recovery_range(status: &CollectionStatus) -> (f64, f64) {
    match status {
        CollectionStatus::Settled => (0.4, 0.9),
        CollectionStatus::LegalAction => (0.1, 0.6),
        CollectionStatus::WrittenOff => (0.0, 0.3),
        _ => (0.0, 0.5),
    }
}

fn generate_defaults(rng: &mut StreamRng, config: &GeneratorConfig, loans: &[Loan]) -> Vec<DefaultCollection> {
    if loans.is_empty() {
        return Vec::new();
    }
    let n = config.defaults;
    let mut defaults = Vec::with_capacity(n);
    for i in 0..n {
        let loan = &loans[rng.index(loans.len())];
        let days_overdue = rng.range_i64(30, 1095);
        let default_amount = round2(rng.range_f64(100_000.0, 800_000.0));
        let status = collection_status(rng, config, days_overdue);

        let contact_attempts = rng.range_i64(5, 50) as u32;
        let contacted_days_ago = rng.range_i64(1, days_overdue.min(90));
        let legal_notice_sent = matches!(status, CollectionStatus::LegalAction | CollectionStatus::WrittenOff)
            || (days_overdue > 180 && rng.chance(0.4));
        let (lo, hi) = recovery_range(&status);
        let recovery_amount = round2(default_amount * rng.range_f64(lo, hi));
        let collection_agent_id = rng.range_i64(1, 100);

        defaults.push(DefaultCollection {
            default_id: i as i64 + 1,
            customer_id: loan.customer_id,
            loan_id: loan.loan_id,
            default_date: Some(config.snapshot_date - Duration::days(days_overdue)),
            default_amount,
            days_overdue: Some(days_overdue),
            collection_status: status,
            last_contact_date: Some(config.snapshot_date - Duration::days(contacted_days_ago)),
            contact_attempts: Some(contact_attempts),
            legal_notice_sent: Some(legal_notice_sent),
            recovery_amount: Some(recovery_amount),
            collection_agent_id: Some(collection_agent_id),
        });

        if (i + 1) % PROGRESS_EVERY == 0 {
            log::info!("generator: {} / {n} defaults", i + 1);
        }
    }
    defaults
}

fn generate_indicators(rng: &mut StreamRng, config: &GeneratorConfig, states: &[State]) -> Vec<EconomicIndicator> {
    let mut indicators = Vec::with_capacity(states.len() * config.indicators_per_state);
    for state in states {
        for _ in 0..config.indicators_per_state {
            let year = rng.range_i64(2019, 2024) as i32;
            let quarter = Quarter::new(year, rng.range_i64(1, 4) as u8).unwrap_or(Quarter { year, quarter: 1 });

            let (mut gdp, inflation, mut unemployment, per_capita) = match state.region {
                Region::West | Region::South => (
                    rng.range_f64(6.5, 9.5),
                    rng.range_f64(3.0, 6.2),
                    rng.range_f64(2.0, 5.5),
                    rng.range_f64(220_000.0, 450_000.0),
                ),
                Region::North => (
                    rng.range_f64(5.5, 8.0),
                    rng.range_f64(3.2, 6.8),
                    rng.range_f64(2.8, 6.5),
                    rng.range_f64(190_000.0, 350_000.0),
                ),
                _ => (
                    rng.range_f64(3.5, 7.0),
                    rng.range_f64(3.8, 7.8),
                    rng.range_f64(3.5, 11.0),
                    rng.range_f64(130_000.0, 280_000.0),
                ),
            };
            match year {
                2020 => {
                    gdp *= rng.range_f64(0.4, 0.7);
                    unemployment *= rng.range_f64(1.3, 1.6);
                }
                2021 => {
                    gdp *= rng.range_f64(0.7, 0.9);
                    unemployment *= rng.range_f64(1.1, 1.3);
                }
                _ => {}
            }

            indicators.push(EconomicIndicator {
                indicator_id: indicators.len() as i64 + 1,
                state_id: state.state_id,
                quarter,
                gdp_growth_rate: Some(round2(gdp)),
                inflation_rate: Some(round2(inflation)),
                unemployment_rate: Some(round2(unemployment)),
                per_capita_income: Some(round2(per_capita)),
            });
        }
    }
    log::info!("generator: {} economic indicators", indicators.len());
    indicators
}

fn inject_faults(
    rng: &mut StreamRng,
    config: &GeneratorConfig,
    customers: &mut [Customer],
    defaults: &mut [DefaultCollection],
) {
    let (mut missing, mut short, mut undated) = (0usize, 0usize, 0usize);
    for c in customers.iter_mut() {
        // Both rolls are always drawn so one rate never shifts the other's picks.
        let drop_phone = rng.chance(config.missing_phone_rate);
        let truncate = rng.chance(config.short_phone_rate);
        if drop_phone {
            c.phone_number = None;
            missing += 1;
        } else if truncate {
            if let Some(p) = c.phone_number.as_mut() {
                p.truncate(7);
                short += 1;
            }
        }
    }
    for d in defaults.iter_mut() {
        if rng.chance(config.missing_default_date_rate) {
            d.default_date = None;
            d.days_overdue = None;
            undated += 1;
        }
    }
    log::info!(
        "generator: injected {missing} missing phones, {short} short phones, {undated} undated defaults"
    );
}
