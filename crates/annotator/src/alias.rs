//! Alias — memoized aliasing of matched identifiers.
//!
//! Node logs carry long opaque identifiers (instance handles, module
//! hashes). An [`AliasResolver`] maps each distinct identifier to a short
//! stable alias, built lazily on first sight by a pluggable builder; an
//! [`AliasReplacer`] applies a resolver to every occurrence matched by a
//! configured pattern, rewriting the line before the block filters see it.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

/// Alias cache: original string → alias.
pub type Aliases = HashMap<String, String>;

/// Builds a new alias for a key the resolver has not seen before.
///
/// Receives the current alias map, the ordered alias source list, and the
/// key being aliased.
pub type AliasBuilder =
    Box<dyn FnMut(&Aliases, &[String], &str) -> Result<String, AliasError> + Send>;

#[derive(Error, Debug)]
pub enum AliasError {
    #[error("alias source exhausted: {needed} aliases needed, {available} available")]
    SourceExhausted { needed: usize, available: usize },

    #[error("alias builder failed for '{key}': {reason}")]
    Builder { key: String, reason: String },
}

/// Memoizing key → alias resolver.
///
/// The builder runs at most once per distinct key for the life of the
/// resolver; cached aliases are never recomputed or evicted.
pub struct AliasResolver {
    aliases: Aliases,
    source: Vec<String>,
    builder: AliasBuilder,
}

impl AliasResolver {
    pub fn new(source: Vec<String>, builder: AliasBuilder) -> Self {
        Self {
            aliases: Aliases::new(),
            source,
            builder,
        }
    }

    /// Resolve `key` to its alias, building and caching it on first sight.
    ///
    /// A builder error leaves the cache untouched for `key`, so a retry
    /// re-invokes the builder.
    pub fn resolve(&mut self, key: &str) -> Result<String, AliasError> {
        if let Some(alias) = self.aliases.get(key) {
            return Ok(alias.clone());
        }
        let alias = (self.builder)(&self.aliases, &self.source, key)?;
        tracing::debug!(key, alias = %alias, "new alias");
        self.aliases.insert(key.to_string(), alias.clone());
        Ok(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Snapshot of the alias map, for reporting.
    pub fn aliases(&self) -> &Aliases {
        &self.aliases
    }
}

/// Stock alias builders.
pub mod builders {
    use super::{AliasBuilder, AliasError, Aliases};

    /// Hand out entries of the alias source list in order, one per new key.
    ///
    /// Errs once the list runs out; the failed key stays unaliased and will
    /// retry on its next sighting.
    pub fn sequential() -> AliasBuilder {
        Box::new(|aliases: &Aliases, source: &[String], _key: &str| {
            source
                .get(aliases.len())
                .cloned()
                .ok_or(AliasError::SourceExhausted {
                    needed: aliases.len() + 1,
                    available: source.len(),
                })
        })
    }

    /// Number new keys as `{prefix}{n}`, starting at 1.
    pub fn numbered(prefix: &str) -> AliasBuilder {
        let prefix = prefix.to_string();
        Box::new(move |aliases: &Aliases, _source: &[String], _key: &str| {
            Ok(format!("{}{}", prefix, aliases.len() + 1))
        })
    }
}

/// Rewrites every aliasable token in a line.
pub struct AliasReplacer {
    pattern: Regex,
    group: usize,
    resolver: AliasResolver,
}

impl AliasReplacer {
    pub fn new(pattern: Regex, group: usize, resolver: AliasResolver) -> Self {
        Self {
            pattern,
            group,
            resolver,
        }
    }

    /// Replace each captured token in `line` with its alias.
    ///
    /// Matches are collected against the original line; each non-empty
    /// capture is then replaced wherever it occurs in the line, not just at
    /// the match position — the captured text is one token to alias
    /// consistently. A match whose capture group did not participate is
    /// skipped.
    pub fn replace(&mut self, line: &str) -> Result<String, AliasError> {
        let captured: Vec<String> = self
            .pattern
            .captures_iter(line)
            .filter_map(|caps| caps.get(self.group))
            .map(|m| m.as_str().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        let mut line = line.to_string();
        for original in captured {
            let alias = self.resolver.resolve(&original)?;
            line = line.replace(&original, &alias);
        }
        Ok(line)
    }

    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }
}
