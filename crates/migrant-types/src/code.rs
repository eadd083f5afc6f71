//! Identifier types.
//!
//! Clinical events are coded with SNOMED CT identifiers (SCTIDs), which are
//! 64-bit unsigned integers. Patients are keyed by the pseudonymised integer
//! id assigned by the backend.

/// A SNOMED CT identifier (SCTID) as recorded on a clinical event.
///
/// # Examples
///
/// ```
/// use migrant_types::SctId;
///
/// let born_in_uk: SctId = 315354004;
/// ```
pub type SctId = u64;

/// Pseudonymised patient identifier.
pub type PatientId = u64;
