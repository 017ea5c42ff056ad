pub mod applicator;
pub mod loader;
pub mod schema;
pub mod settings;

pub use applicator::{apply_plan, ApplicationError, EditResult, FileChange, PlanReport};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    EditDefinition, EditPlan, Metadata, Operation, Target, TargetRequirement, ValidationError,
    ValidationIssue,
};
pub use settings::{IndentationText, ManipulationSettings, NewLineKind};
