// src/task/resolve.rs

//! `{alias}` placeholder expansion.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::model::{resolve_env_value, BasePaths, TaskDefinition};
use crate::task::CommandLine;

static ALIAS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("alias token regex is valid"));

/// Expands `{alias}` tokens in argument templates.
///
/// Each token is replaced by `base_paths[alias]`. A value that still starts
/// with `$` is looked up in the environment (literal value kept when unset).
/// Tokens naming an unknown alias are left verbatim.
pub struct PathResolver<'a, F = fn(&str) -> Option<String>> {
    base_paths: &'a BasePaths,
    env: F,
}

impl<'a> PathResolver<'a> {
    /// Resolver backed by the process environment.
    pub fn new(base_paths: &'a BasePaths) -> Self {
        Self {
            base_paths,
            env: process_env,
        }
    }
}

impl<'a, F> PathResolver<'a, F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn with_env(base_paths: &'a BasePaths, env: F) -> Self {
        Self { base_paths, env }
    }

    pub fn resolve(&self, template: &str) -> String {
        ALIAS_TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                match self.base_paths.get(&caps[1]) {
                    Some(value) => resolve_env_value(value, &self.env),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// `interpreter script_path arg...`, every part fully resolved.
    ///
    /// The interpreter is used as written; only the script path and the
    /// arguments are templates.
    pub fn command_line(&self, task: &TaskDefinition) -> CommandLine {
        let mut parts = Vec::with_capacity(task.arguments.len() + 2);
        parts.push(task.interpreter.clone());
        parts.push(self.resolve(&task.script_path));
        parts.extend(task.arguments.iter().map(|arg| self.resolve(arg)));
        CommandLine::new(parts)
    }
}

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
