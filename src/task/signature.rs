// src/task/signature.rs

use std::fmt;

use sha2::{Digest, Sha256};

use crate::task::CommandLine;

/// Number of hex characters of the SHA-256 digest kept in a signature.
pub const DIGEST_LEN: usize = 10;

/// Identity of one task instance: `"{automation_id}_{digest10}"`.
///
/// The digest covers the space-joined, fully-resolved command line, so every
/// distinct argument combination gets its own lock and cooldown lineage. No
/// whitespace or ordering normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskSignature(String);

impl TaskSignature {
    pub fn new(automation_id: &str, command: &CommandLine) -> Self {
        Self(signature(automation_id, command.parts()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lock_file_name(&self) -> String {
        format!("{}.lock", self.0)
    }

    pub fn lastrun_file_name(&self) -> String {
        format!("{}.lastrun", self.0)
    }
}

impl fmt::Display for TaskSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the signature string for `automation_id` and the command parts.
pub fn signature<S: AsRef<str>>(automation_id: &str, command_parts: &[S]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in command_parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b" ");
        }
        hasher.update(part.as_ref().as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    format!("{}_{}", automation_id, &digest[..DIGEST_LEN])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_digest() {
        let expected = {
            let digest = format!("{:x}", Sha256::digest(b"python3 run.py"));
            format!("JOB_{}", &digest[..10])
        };
        assert_eq!(signature("JOB", &["python3", "run.py"]), expected);
    }

    #[test]
    fn joining_is_plain_single_space() {
        // "a b" + "c" and "a" + "b c" join to the same string.
        assert_eq!(
            signature("X", &["a b", "c"]),
            signature("X", &["a", "b c"])
        );
    }

    #[test]
    fn argument_change_changes_signature() {
        let a = signature("X", &["python3", "job.py", "10"]);
        let b = signature("X", &["python3", "job.py", "11"]);
        assert_ne!(a, b);
        assert!(a.starts_with("X_"));
        assert_eq!(a.len(), "X_".len() + DIGEST_LEN);
    }

    #[test]
    fn file_names_derive_from_signature() {
        let cmd = CommandLine::new(vec!["sh".to_string(), "x.sh".to_string()]);
        let sig = TaskSignature::new("ID", &cmd);
        assert_eq!(sig.lock_file_name(), format!("{sig}.lock"));
        assert_eq!(sig.lastrun_file_name(), format!("{sig}.lastrun"));
    }
}
