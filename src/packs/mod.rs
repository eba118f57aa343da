//! Knowledge packs: TOML bundles of predicates, facts and rules.
//!
//! A pack declares its predicates (which fixes their arities for every
//! clause in the pack) and lists clauses in program syntax:
//!
//! ```toml
//! [pack]
//! name = "socrates"
//! description = "Men are mortal."
//!
//! [[predicates]]
//! name = "homem"
//! arity = 1
//!
//! [clauses]
//! facts = ["homem(socrates)"]
//! rules = ["mortal(X) :- homem(X)"]
//! ```
//!
//! Two packs are bundled into the binary: `socrates` and `family`.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{KbResult, ProgramError};
use crate::kb::KnowledgeBase;
use crate::logic::{Fact, Predicate, Rule};
use crate::program::{self, Clause, Signature};

// ── Errors ──────────────────────────────────────────────────────────────

#[derive(Debug, Error, Diagnostic)]
pub enum PackError {
    #[error("knowledge pack not found: \"{name}\"")]
    #[diagnostic(
        code(hornkb::pack::not_found),
        help("List the bundled packs with `hornkb packs`, or pass a pack file path.")
    )]
    NotFound { name: String },

    #[error("failed to parse knowledge pack \"{name}\": {message}")]
    #[diagnostic(
        code(hornkb::pack::parse),
        help(
            "Check the TOML syntax. A pack needs a [pack] table with `name`, \
             optional [[predicates]] entries with `name` and `arity`, and a \
             [clauses] table with `facts`, `rules` and/or `program`."
        )
    )]
    Parse { name: String, message: String },

    #[error("failed to read knowledge pack file: {path}")]
    #[diagnostic(code(hornkb::pack::io), help("Ensure the file exists and is readable."))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid clause in knowledge pack \"{name}\": {entry}")]
    #[diagnostic(code(hornkb::pack::program))]
    Program {
        name: String,
        entry: String,
        #[source]
        #[diagnostic_source]
        source: ProgramError,
    },

    #[error("fact entry in knowledge pack \"{name}\" has variables: {entry}")]
    #[diagnostic(
        code(hornkb::pack::non_ground),
        help("Entries under `facts` must be ground. Move general clauses to `rules` or `program`.")
    )]
    NonGroundFact { name: String, entry: String },
}

pub type PackResult<T> = std::result::Result<T, PackError>;

// ── Pack data model ─────────────────────────────────────────────────────

/// Where a knowledge pack came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackSource {
    /// Bundled into the binary via `include_str!`.
    Bundled,
    /// Loaded from a file.
    External(PathBuf),
}

/// A parsed, validated knowledge pack.
#[derive(Debug, Clone)]
pub struct KnowledgePack {
    pub name: String,
    pub description: String,
    pub predicates: Vec<Predicate>,
    pub facts: Vec<Fact>,
    pub rules: Vec<Rule>,
    pub source: PackSource,
}

/// Report after applying a knowledge pack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackReport {
    pub name: String,
    pub facts_added: usize,
    /// Facts that were already stored.
    pub facts_skipped: usize,
    pub rules_added: usize,
    /// Rules identical to one already stored.
    pub rules_skipped: usize,
}

// ── TOML deserialization helpers ─────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PackToml {
    pack: PackMeta,
    #[serde(default)]
    predicates: Vec<PredicateToml>,
    #[serde(default)]
    clauses: ClausesToml,
}

#[derive(Debug, Deserialize)]
struct PackMeta {
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct PredicateToml {
    name: String,
    arity: usize,
}

#[derive(Debug, Default, Deserialize)]
struct ClausesToml {
    #[serde(default)]
    facts: Vec<String>,
    #[serde(default)]
    rules: Vec<String>,
    #[serde(default)]
    program: Option<String>,
}

// ── Bundled packs ───────────────────────────────────────────────────────

const SOCRATES_TOML: &str = include_str!("../../data/packs/socrates/pack.toml");
const FAMILY_TOML: &str = include_str!("../../data/packs/family/pack.toml");

const BUNDLED: [(&str, &str); 2] = [("socrates", SOCRATES_TOML), ("family", FAMILY_TOML)];

/// Every bundled pack that parses. Broken packs are logged and left out.
pub fn bundled_packs() -> Vec<KnowledgePack> {
    BUNDLED
        .iter()
        .filter_map(|(name, text)| match KnowledgePack::parse(text, PackSource::Bundled) {
            Ok(pack) => Some(pack),
            Err(e) => {
                tracing::warn!(pack = name, "Failed to parse bundled pack: {e}");
                None
            }
        })
        .collect()
}

impl KnowledgePack {
    /// Parse pack TOML.
    pub fn parse(text: &str, source: PackSource) -> PackResult<Self> {
        let parsed: PackToml = toml::from_str(text).map_err(|e| PackError::Parse {
            name: "(unknown)".into(),
            message: e.to_string(),
        })?;
        let name = parsed.pack.name;

        let predicates: Vec<Predicate> = parsed
            .predicates
            .iter()
            .map(|p| Predicate::new(p.name.as_str(), p.arity))
            .collect();
        let signature = predicates
            .iter()
            .fold(Signature::new(), |signature, p| signature.with(p));

        let program_error = |entry: &str, source| PackError::Program {
            name: name.clone(),
            entry: entry.to_string(),
            source,
        };

        let mut facts = Vec::new();
        let mut rules = Vec::new();

        for entry in &parsed.clauses.facts {
            let fact = program::parse_fact_with(entry, &signature)
                .map_err(|source| program_error(entry.as_str(), source))?;
            if !fact.is_ground() {
                return Err(PackError::NonGroundFact {
                    name: name.clone(),
                    entry: entry.clone(),
                });
            }
            facts.push(fact);
        }

        for entry in &parsed.clauses.rules {
            let rule = program::parse_rule_with(entry, &signature)
                .map_err(|source| program_error(entry.as_str(), source))?;
            rules.push(rule);
        }

        if let Some(text) = &parsed.clauses.program {
            let program = program::parse_program_with(text, &signature)
                .map_err(|source| program_error("[clauses] program", source))?;
            for clause in program.clauses {
                match clause {
                    Clause::Fact(fact) if fact.is_ground() => facts.push(fact),
                    Clause::Fact(fact) => rules.push(Rule::new(fact, Vec::new())),
                    Clause::Rule(rule) => rules.push(rule),
                }
            }
        }

        Ok(Self {
            name,
            description: parsed.pack.description,
            predicates,
            facts,
            rules,
            source,
        })
    }

    /// Read and parse a pack file.
    pub fn load(path: &Path) -> PackResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| PackError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, PackSource::External(path.to_path_buf()))
    }

    /// A pack bundled into the binary, by name.
    pub fn bundled(name: &str) -> PackResult<Self> {
        let (_, text) = BUNDLED
            .iter()
            .find(|(bundled, _)| *bundled == name)
            .ok_or_else(|| PackError::NotFound {
                name: name.to_string(),
            })?;
        Self::parse(text, PackSource::Bundled)
    }

    /// Names of the bundled packs.
    pub fn bundled_names() -> impl Iterator<Item = &'static str> {
        BUNDLED.iter().map(|(name, _)| *name)
    }

    /// The declared predicates as a parsing signature.
    pub fn signature(&self) -> Signature {
        self.predicates
            .iter()
            .fold(Signature::new(), |signature, p| signature.with(p))
    }

    /// Add the pack's facts and rules to `kb`.
    ///
    /// Applying the same pack twice adds nothing the second time.
    pub fn apply(&self, kb: &mut KnowledgeBase) -> KbResult<PackReport> {
        let mut report = PackReport {
            name: self.name.clone(),
            ..PackReport::default()
        };

        for fact in &self.facts {
            if kb.add_fact(fact.clone())? {
                report.facts_added += 1;
            } else {
                report.facts_skipped += 1;
            }
        }

        for rule in &self.rules {
            if kb.rules().contains(rule) {
                report.rules_skipped += 1;
            } else {
                kb.add_rule(rule.clone());
                report.rules_added += 1;
            }
        }

        tracing::info!(
            pack = %self.name,
            facts_added = report.facts_added,
            facts_skipped = report.facts_skipped,
            rules_added = report.rules_added,
            "knowledge pack applied"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_packs_parse() {
        let packs = bundled_packs();
        assert_eq!(packs.len(), 2);
        assert!(packs.iter().any(|p| p.name == "socrates"));
        assert!(packs.iter().any(|p| p.name == "family"));
        assert!(packs.iter().all(|p| p.source == PackSource::Bundled));
    }

    #[test]
    fn bundled_lookup_by_name() {
        let pack = KnowledgePack::bundled("socrates").unwrap();
        assert_eq!(pack.facts.len(), 3);
        assert_eq!(pack.rules.len(), 1);
        assert_eq!(pack.signature().arity_of("homem"), Some(1));
        assert!(matches!(
            KnowledgePack::bundled("atlantis"),
            Err(PackError::NotFound { .. })
        ));
        assert_eq!(
            KnowledgePack::bundled_names().collect::<Vec<_>>(),
            vec!["socrates", "family"]
        );
    }

    #[test]
    fn apply_socrates_pack() {
        let mut kb = KnowledgeBase::new();
        let pack = KnowledgePack::bundled("socrates").unwrap();
        let report = pack.apply(&mut kb).unwrap();
        assert_eq!(report.facts_added, 3);
        assert_eq!(report.rules_added, 1);

        let mortal = Predicate::new("mortal", 1);
        assert!(kb.query(&mortal.fact(["socrates"]).unwrap()));
        assert!(!kb.query(&mortal.fact(["maria"]).unwrap()));
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let mut kb = KnowledgeBase::new();
        let pack = KnowledgePack::bundled("family").unwrap();
        pack.apply(&mut kb).unwrap();
        let second = pack.apply(&mut kb).unwrap();
        assert_eq!(second.facts_added, 0);
        assert_eq!(second.facts_skipped, pack.facts.len());
        assert_eq!(second.rules_added, 0);
        assert_eq!(kb.len_rules(), pack.rules.len());
    }

    #[test]
    fn declared_arity_is_enforced() {
        let text = r#"
[pack]
name = "bad"

[[predicates]]
name = "homem"
arity = 1

[clauses]
facts = ["homem(a, b)"]
"#;
        let err = KnowledgePack::parse(text, PackSource::Bundled).unwrap_err();
        assert!(matches!(
            err,
            PackError::Program {
                source: ProgramError::Literal { .. },
                ..
            }
        ));
    }

    #[test]
    fn fact_entries_must_be_ground() {
        let text = r#"
[pack]
name = "bad"

[clauses]
facts = ["homem(X)"]
"#;
        assert!(matches!(
            KnowledgePack::parse(text, PackSource::Bundled),
            Err(PackError::NonGroundFact { .. })
        ));
    }

    #[test]
    fn program_text_mixes_clauses() {
        let text = r#"
[pack]
name = "mixed"

[clauses]
program = """
edge(a, b).
edge(b, c).
path(X, Y) :- edge(X, Y).
path(X, Z) :- edge(X, Y), path(Y, Z).
"""
"#;
        let pack = KnowledgePack::parse(text, PackSource::Bundled).unwrap();
        assert_eq!(pack.facts.len(), 2);
        assert_eq!(pack.rules.len(), 2);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            KnowledgePack::parse("[pack\nname = 1", PackSource::Bundled),
            Err(PackError::Parse { .. })
        ));
    }
}
