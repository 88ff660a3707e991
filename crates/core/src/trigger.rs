//! Inbound trigger invocation types.
//!
//! A [`TriggerRequest`] is built once per callback from the path-derived job
//! name and the raw request body, and dropped when dispatch completes.

use std::fmt;

use serde::Serialize;

/// Reasons a string is rejected as a job name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobNameError {
    #[error("Job name must not be empty")]
    Empty,

    #[error("Job name must not contain '/': {0}")]
    ContainsSlash(String),
}

/// Name of the scheduled job that fired. Always non-empty and a single path
/// segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    pub fn new(name: impl Into<String>) -> Result<Self, JobNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(JobNameError::Empty);
        }
        if name.contains('/') {
            return Err(JobNameError::ContainsSlash(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JobName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for JobName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One job firing: the job name plus the opaque request body.
#[derive(Debug, Clone)]
pub struct TriggerRequest {
    job_name: JobName,
    payload: Vec<u8>,
}

impl TriggerRequest {
    pub fn new(job_name: JobName, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            job_name,
            payload: payload.into(),
        }
    }

    pub fn job_name(&self) -> &JobName {
        &self.job_name
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_name() {
        assert_eq!(JobName::new(""), Err(JobNameError::Empty));
    }

    #[test]
    fn rejects_name_with_slash() {
        assert_eq!(
            JobName::new("a/b"),
            Err(JobNameError::ContainsSlash("a/b".into()))
        );
    }

    #[test]
    fn accepts_arbitrary_segment() {
        let name = JobName::new("nightly-report.v2").unwrap();
        assert_eq!(name, "nightly-report.v2");
        assert_eq!(name.to_string(), "nightly-report.v2");
    }

    #[test]
    fn request_keeps_empty_payload() {
        let request = TriggerRequest::new(JobName::new("job").unwrap(), Vec::new());
        assert!(request.payload().is_empty());
        assert_eq!(request.job_name().as_str(), "job");
    }

    #[test]
    fn job_name_serializes_as_plain_string() {
        let name = JobName::new("cleanup").unwrap();
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"cleanup\"");
    }
}
