//! # migrant-types
//!
//! Type definitions for the primary-care tables consumed by the migrant
//! cohort study: patients, coded clinical events, practice registrations,
//! addresses and ONS death registrations.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!
//! ## Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use migrant_types::{ClinicalEvent, Patient, Sex, SctId};
//! use migrant_types::well_known;
//!
//! let patient = Patient {
//!     patient_id: 1,
//!     sex: Sex::Female,
//!     date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1),
//!     date_of_death: None,
//! };
//! assert!(patient.sex.is_non_disclosive());
//!
//! let code: SctId = 161152006;
//! let event = ClinicalEvent { patient_id: 1, date: None, snomedct_code: code };
//! assert_eq!(event.patient_id, patient.patient_id);
//!
//! assert_eq!(well_known::ANY_MIGRANT, "any_migrant");
//! ```

#![warn(missing_docs)]

mod address;
mod code;
mod death;
mod enums;
mod event;
mod patient;
mod registration;
pub mod well_known;

// Re-export all public types at crate root
pub use address::Address;
pub use code::{PatientId, SctId};
pub use death::OnsDeath;
pub use enums::Sex;
pub use event::ClinicalEvent;
pub use patient::Patient;
pub use registration::PracticeRegistration;
