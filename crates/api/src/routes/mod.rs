pub mod health;
pub mod job_trigger;

pub use job_trigger::{JobTriggerRouterExt, TriggerOptions, JOB_TRIGGER_PATH};
