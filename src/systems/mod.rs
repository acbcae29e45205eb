pub mod dispatch;
pub mod outcome;
pub mod progress;
pub mod recovery;
pub mod status;

pub use dispatch::{cancel, check_facility, dispatch, DispatchError};
pub use outcome::{resolve_completion, TaskOutcome};
pub use progress::{advance, collect_completed};
pub use recovery::{is_suitable, rest, Suitability};
pub use status::{character_status, CharacterStatus, SkillSummary, TaskProgress};
