//! Occupation taxonomy reference data and the catalog seam the candidate
//! services read it through.
//!
//! Entities mirror the OFO (Organising Framework for Occupations) content
//! layer: industries, occupations, and the tasks assessments are generated
//! from. Persistence is owned by the surrounding application; the catalog
//! trait hands the core already-loaded value records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for occupations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OccupationId(pub String);

/// Identifier wrapper for occupation tasks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

/// OFO code, the standardized occupation taxonomy identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OfoCode(pub String);

/// Industry lookup record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Industry {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// OFO occupation reference data, including the tasks used to generate
/// candidate assessments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub id: OccupationId,
    pub code: OfoCode,
    pub title: String,
    pub description: String,
    pub industry: Option<Industry>,
    /// Typical years of experience required (0 = entry level).
    pub years_of_experience: u32,
    /// Preferred NQF level, 0 = no preference.
    pub preferred_nqf_level: u8,
    pub tasks: Vec<OccupationTask>,
}

/// A task associated with an occupation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupationTask {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
}

/// Catalog access error.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("content catalog unavailable: {0}")]
    Unavailable(String),
}

/// Read seam over the occupation taxonomy.
///
/// Implementations return occupations in ascending OFO-code order so that
/// aggregation output stays deterministic.
pub trait ContentCatalog: Send + Sync {
    fn occupation(&self, id: &OccupationId) -> Result<Option<Occupation>, CatalogError>;

    fn task(&self, id: &TaskId) -> Result<Option<OccupationTask>, CatalogError>;

    /// Full occupation listing for content browsing.
    fn occupations(&self) -> Result<Vec<Occupation>, CatalogError>;

    /// Occupations sharing one of the given industries, excluding the given
    /// occupation ids, capped at `limit`. Used for recommendation fill.
    fn related_by_industry(
        &self,
        industry_codes: &BTreeSet<String>,
        exclude: &BTreeSet<OccupationId>,
        limit: usize,
    ) -> Result<Vec<Occupation>, CatalogError>;
}
