//! Discovery pipeline.
//!
//! - `gather`: bounded, failure-isolated fan-out of search tasks
//! - `normalize`: salary, location and date canonicalization plus dedup
//! - `eligibility`: timezone, visa and remote gates for international postings
//! - `scorer`: five-factor candidate match score
//! - `ranker`: stable top-K ordering
//! - `orchestrator`: `Discovery`, which runs the stages end to end

pub mod eligibility;
pub mod gather;
pub mod normalize;
pub mod orchestrator;
pub mod ranker;
pub mod scorer;

pub use eligibility::EligibilityFilter;
pub use gather::{Gathered, TaskFailure, TaskOutcome, gather_isolated};
pub use normalize::{Normalizer, dedup, dedup_key, parse_posted_date, parse_salary};
pub use orchestrator::Discovery;
pub use ranker::rank;
pub use scorer::{EducationLevel, Scorer, extract_skills};
