//! In-memory patient store.
//!
//! Holds the backend tables indexed by patient and exposes a read-only
//! [`PatientRecord`] view per patient. The view implements the table
//! semantics the study definitions rely on: events sorted by date, the
//! registration or address current on a date, and so on.
//!
//! ```ignore
//! let files = discover_backend_files("output/extract")?;
//! let mut store = PatientStore::new();
//! store.load_all(&files, LoadConfig::default())?;
//!
//! for record in store.records() {
//!     let registered = record.is_registered_on(census_date);
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use migrant_types::{
    Address, ClinicalEvent, OnsDeath, Patient, PatientId, PracticeRegistration, SctId,
};

use crate::codelist::Codelist;
use crate::loader::format_bytes;
use crate::parser::{TableParser, TableRecord};
use crate::types::{BackendFiles, LoadConfig, LoadResult, ParseStats};

/// In-memory store for a backend extract.
#[derive(Default)]
pub struct PatientStore {
    /// Patients ordered by id.
    patients: BTreeMap<PatientId, Patient>,
    /// Clinical events by patient, sorted by date (undated first).
    events_by_patient: HashMap<PatientId, Vec<ClinicalEvent>>,
    /// Practice registrations by patient, sorted by start date.
    registrations_by_patient: HashMap<PatientId, Vec<PracticeRegistration>>,
    /// Addresses by patient, sorted by start date.
    addresses_by_patient: HashMap<PatientId, Vec<Address>>,
    /// ONS death registrations by patient.
    ons_deaths_by_patient: HashMap<PatientId, OnsDeath>,
}

impl std::fmt::Debug for PatientStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientStore")
            .field("patients", &self.patients.len())
            .field("events", &self.event_count())
            .field("registrations", &self.registration_count())
            .field("addresses", &self.address_count())
            .field("ons_deaths", &self.ons_deaths_by_patient.len())
            .finish()
    }
}

/// Row counts from loading an extract.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Patients loaded.
    pub patients: ParseStats,
    /// Clinical events loaded.
    pub clinical_events: ParseStats,
    /// Practice registrations loaded.
    pub practice_registrations: ParseStats,
    /// Addresses loaded.
    pub addresses: ParseStats,
    /// ONS deaths loaded.
    pub ons_deaths: ParseStats,
}

impl PatientStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every discovered table, one after another.
    pub fn load_all(&mut self, files: &BackendFiles, config: LoadConfig) -> LoadResult<LoadSummary> {
        let patients = read_optional::<Patient>(files.patients.as_deref(), &config)?;
        let events = read_optional::<ClinicalEvent>(files.clinical_events.as_deref(), &config)?;
        let registrations = read_optional::<PracticeRegistration>(
            files.practice_registrations.as_deref(),
            &config,
        )?;
        let addresses = read_optional::<Address>(files.addresses.as_deref(), &config)?;
        let deaths = read_optional::<OnsDeath>(files.ons_deaths.as_deref(), &config)?;

        Ok(self.insert_tables(patients, events, registrations, addresses, deaths))
    }

    /// Loads every discovered table, parsing the tables concurrently.
    ///
    /// Produces the same store as [`load_all`](Self::load_all).
    #[cfg(feature = "parallel")]
    pub fn load_all_parallel(
        &mut self,
        files: &BackendFiles,
        config: LoadConfig,
    ) -> LoadResult<LoadSummary> {
        let ((patients, events), (registrations, (addresses, deaths))) = rayon::join(
            || {
                rayon::join(
                    || read_optional::<Patient>(files.patients.as_deref(), &config),
                    || read_optional::<ClinicalEvent>(files.clinical_events.as_deref(), &config),
                )
            },
            || {
                rayon::join(
                    || {
                        read_optional::<PracticeRegistration>(
                            files.practice_registrations.as_deref(),
                            &config,
                        )
                    },
                    || {
                        rayon::join(
                            || read_optional::<Address>(files.addresses.as_deref(), &config),
                            || read_optional::<OnsDeath>(files.ons_deaths.as_deref(), &config),
                        )
                    },
                )
            },
        );

        Ok(self.insert_tables(patients?, events?, registrations?, addresses?, deaths?))
    }

    fn insert_tables(
        &mut self,
        (patients, patient_stats): (Vec<Patient>, ParseStats),
        (events, event_stats): (Vec<ClinicalEvent>, ParseStats),
        (registrations, registration_stats): (Vec<PracticeRegistration>, ParseStats),
        (addresses, address_stats): (Vec<Address>, ParseStats),
        (deaths, death_stats): (Vec<OnsDeath>, ParseStats),
    ) -> LoadSummary {
        self.insert_patients(patients);
        self.insert_events(events);
        self.insert_registrations(registrations);
        self.insert_addresses(addresses);
        self.insert_ons_deaths(deaths);

        tracing::info!(
            "Loaded {} patients, {} events, {} registrations, {} addresses, {} ONS deaths",
            self.patient_count(),
            self.event_count(),
            self.registration_count(),
            self.address_count(),
            self.ons_deaths_by_patient.len()
        );

        LoadSummary {
            patients: patient_stats,
            clinical_events: event_stats,
            practice_registrations: registration_stats,
            addresses: address_stats,
            ons_deaths: death_stats,
        }
    }

    /// Inserts patients (replacing any with the same id).
    pub fn insert_patients(&mut self, patients: impl IntoIterator<Item = Patient>) {
        for patient in patients {
            self.patients.insert(patient.patient_id, patient);
        }
    }

    /// Inserts clinical events.
    pub fn insert_events(&mut self, events: impl IntoIterator<Item = ClinicalEvent>) {
        for event in events {
            self.events_by_patient
                .entry(event.patient_id)
                .or_default()
                .push(event);
        }
        for events in self.events_by_patient.values_mut() {
            events.sort_by_key(|e| e.date);
        }
    }

    /// Inserts practice registrations.
    pub fn insert_registrations(
        &mut self,
        registrations: impl IntoIterator<Item = PracticeRegistration>,
    ) {
        for registration in registrations {
            self.registrations_by_patient
                .entry(registration.patient_id)
                .or_default()
                .push(registration);
        }
        for registrations in self.registrations_by_patient.values_mut() {
            registrations.sort_by_key(|r| r.start_date);
        }
    }

    /// Inserts addresses.
    pub fn insert_addresses(&mut self, addresses: impl IntoIterator<Item = Address>) {
        for address in addresses {
            self.addresses_by_patient
                .entry(address.patient_id)
                .or_default()
                .push(address);
        }
        for addresses in self.addresses_by_patient.values_mut() {
            addresses.sort_by_key(|a| a.start_date);
        }
    }

    /// Inserts ONS death registrations. The table has at most one row per
    /// patient; for duplicates the earliest date is kept.
    pub fn insert_ons_deaths(&mut self, deaths: impl IntoIterator<Item = OnsDeath>) {
        for death in deaths {
            match self.ons_deaths_by_patient.get_mut(&death.patient_id) {
                Some(existing) if earlier(death.date, existing.date) => *existing = death,
                Some(_) => {}
                None => {
                    self.ons_deaths_by_patient.insert(death.patient_id, death);
                }
            }
        }
    }

    /// Returns the record view for one patient.
    pub fn record(&self, patient_id: PatientId) -> Option<PatientRecord<'_>> {
        self.patients.get(&patient_id).map(|p| self.view(p))
    }

    /// Iterates over all patients in id order.
    pub fn records(&self) -> impl Iterator<Item = PatientRecord<'_>> + '_ {
        self.patients.values().map(|p| self.view(p))
    }

    fn view<'a>(&'a self, patient: &'a Patient) -> PatientRecord<'a> {
        let id = patient.patient_id;
        PatientRecord {
            patient,
            events: self.events_by_patient.get(&id).map_or(&[], Vec::as_slice),
            registrations: self
                .registrations_by_patient
                .get(&id)
                .map_or(&[], Vec::as_slice),
            addresses: self.addresses_by_patient.get(&id).map_or(&[], Vec::as_slice),
            ons_death: self.ons_deaths_by_patient.get(&id),
        }
    }

    /// Returns the number of patients.
    pub fn patient_count(&self) -> usize {
        self.patients.len()
    }

    /// Returns the number of clinical events.
    pub fn event_count(&self) -> usize {
        self.events_by_patient.values().map(Vec::len).sum()
    }

    /// Returns the number of practice registrations.
    pub fn registration_count(&self) -> usize {
        self.registrations_by_patient.values().map(Vec::len).sum()
    }

    /// Returns the number of addresses.
    pub fn address_count(&self) -> usize {
        self.addresses_by_patient.values().map(Vec::len).sum()
    }
}

fn earlier(candidate: Option<NaiveDate>, current: Option<NaiveDate>) -> bool {
    match (candidate, current) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        _ => false,
    }
}

fn read_optional<T: TableRecord + Send>(
    path: Option<&Path>,
    config: &LoadConfig,
) -> LoadResult<(Vec<T>, ParseStats)> {
    let Some(path) = path else {
        return Ok((Vec::new(), ParseStats::default()));
    };

    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    tracing::debug!("Reading {} ({})", path.display(), format_bytes(size));

    let (rows, stats) = TableParser::<BufReader<File>, T>::from_path(path, config.clone())?.parse_all()?;
    if stats.error_count > 0 {
        tracing::warn!(
            "{}: skipped {} malformed rows ({:.1}% loaded)",
            path.display(),
            stats.error_count,
            stats.load_rate()
        );
    }
    Ok((rows, stats))
}

/// Read-only view of one patient's rows across all tables.
#[derive(Debug, Clone, Copy)]
pub struct PatientRecord<'a> {
    /// Demographics.
    pub patient: &'a Patient,
    /// Clinical events sorted by date, undated events first.
    pub events: &'a [ClinicalEvent],
    /// Practice registrations sorted by start date.
    pub registrations: &'a [PracticeRegistration],
    /// Addresses sorted by start date.
    pub addresses: &'a [Address],
    /// ONS death registration, if any.
    pub ons_death: Option<&'a OnsDeath>,
}

impl<'a> PatientRecord<'a> {
    /// Patient id.
    pub fn patient_id(&self) -> PatientId {
        self.patient.patient_id
    }

    /// Events whose code is in `codelist`, in date order.
    pub fn events_in<'c>(
        &self,
        codelist: &'c Codelist,
    ) -> impl Iterator<Item = &'a ClinicalEvent> + 'c
    where
        'a: 'c,
    {
        self.events
            .iter()
            .filter(move |e| codelist.contains(e.snomedct_code))
    }

    /// True if any event has a code in `codelist` (any date, including undated).
    pub fn has_event_in(&self, codelist: &Codelist) -> bool {
        self.events_in(codelist).next().is_some()
    }

    /// Number of events with a code in `codelist`.
    pub fn count_events_in(&self, codelist: &Codelist) -> usize {
        self.events_in(codelist).count()
    }

    /// First event in date order with a code in `codelist`.
    pub fn first_event_in(&self, codelist: &Codelist) -> Option<&'a ClinicalEvent> {
        self.events_in(codelist).next()
    }

    /// Last event in date order with a code in `codelist`, optionally
    /// restricted to events on or before `on_or_before`.
    pub fn latest_event_in(
        &self,
        codelist: &Codelist,
        on_or_before: Option<NaiveDate>,
    ) -> Option<&'a ClinicalEvent> {
        self.events_in(codelist)
            .filter(|e| on_or_before.map_or(true, |date| e.is_on_or_before(date)))
            .last()
    }

    /// Code of the latest event in `codelist`.
    pub fn latest_code_in(
        &self,
        codelist: &Codelist,
        on_or_before: Option<NaiveDate>,
    ) -> Option<SctId> {
        self.latest_event_in(codelist, on_or_before)
            .map(|e| e.snomedct_code)
    }

    /// The practice registration current on `date`.
    ///
    /// With several, the most recent start wins, then the latest end date.
    /// An open-ended registration ranks below any dated end.
    pub fn registration_on(&self, date: NaiveDate) -> Option<&'a PracticeRegistration> {
        self.registrations
            .iter()
            .filter(|r| r.spans(date))
            .max_by_key(|r| (r.start_date, r.end_date))
    }

    /// True if the patient had a registration spanning `date`.
    pub fn is_registered_on(&self, date: NaiveDate) -> bool {
        self.registrations.iter().any(|r| r.spans(date))
    }

    /// Earliest registration by start date.
    pub fn first_registration(&self) -> Option<&'a PracticeRegistration> {
        self.registrations.first()
    }

    /// The address current on `date`.
    ///
    /// With several, the most recent start wins, then addresses with an
    /// MSOA, then the latest end date, then the highest address id.
    pub fn address_on(&self, date: NaiveDate) -> Option<&'a Address> {
        self.addresses
            .iter()
            .filter(|a| a.spans(date))
            .max_by_key(|a| (a.start_date, a.has_msoa(), a.end_date, a.address_id))
    }

    /// ONS registered date of death.
    pub fn ons_death_date(&self) -> Option<NaiveDate> {
        self.ons_death.and_then(|d| d.date)
    }
}
