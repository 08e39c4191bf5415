// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Remote snippet support: provider-hosted dictionaries, ACLs, and backends
//! rendered as VCL fragments and linted as one combined pass.
//!
//! The transport itself lives behind [`SnippetProvider`]; this module only
//! specifies the interface boundary and the rendering of fetched entities
//! into parseable source text. The contract with the provider is "valid,
//! parseable source text in, or an explicit fetch error before linting ever
//! starts."
//!
//! All fetched fragments are concatenated and checked with a single
//! [`Context`], so declaration registration across every snippet completes
//! before any body analysis — a director fragment may reference a backend
//! fragment fetched after it.

use edgelint_core::{Context, Diagnostic, SourceError, check_source};
use miette::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::info;

/// One key/value item of a hosted edge dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryItem {
    /// The item key.
    pub key: String,
    /// The item value.
    pub value: String,
}

/// A hosted edge dictionary, rendered as a `table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDictionary {
    /// The dictionary name.
    pub name: String,
    /// The dictionary items.
    pub items: Vec<DictionaryItem>,
}

/// One entry of a hosted access control list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclEntry {
    /// The address.
    pub ip: String,
    /// Optional subnet mask bits.
    pub subnet: Option<u8>,
    /// Whether the entry is negated.
    pub negated: bool,
    /// Optional entry comment.
    pub comment: Option<String>,
}

/// A hosted access control list, rendered as an `acl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    /// The ACL name.
    pub name: String,
    /// The ACL entries.
    pub entries: Vec<AclEntry>,
}

/// A hosted backend, rendered as a `backend` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBackend {
    /// The backend name.
    pub name: String,
    /// Optional shield site; each distinct shield yields a synthetic
    /// director.
    pub shield: Option<String>,
}

/// The balancing policy of a synthesized director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorType {
    /// Random selection.
    Random,
    /// Consistent hashing.
    Hash,
    /// Client affinity.
    Client,
}

impl DirectorType {
    /// The policy word as it appears in source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Hash => "hash",
            Self::Client => "client",
        }
    }
}

/// The interface to the hosting provider's API.
///
/// Implementations fetch the entities attached to one service version.
/// Errors must surface here, before any linting starts.
pub trait SnippetProvider {
    /// Fetches the hosted edge dictionaries.
    fn dictionaries(&self, version: i64) -> Result<Vec<EdgeDictionary>>;
    /// Fetches the hosted access control lists.
    fn access_lists(&self, version: i64) -> Result<Vec<AccessControl>>;
    /// Fetches the hosted backends.
    fn backends(&self, version: i64) -> Result<Vec<RemoteBackend>>;
}

/// A pre-fetched service snapshot, loaded from a JSON file.
///
/// The live HTTP transport is out of scope; a snapshot file stands in at
/// the same boundary, so `--snippets` exercises the exact flow a remote
/// provider would.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSnapshot {
    /// Hosted edge dictionaries.
    #[serde(default)]
    pub dictionaries: Vec<EdgeDictionary>,
    /// Hosted access control lists.
    #[serde(default)]
    pub access_lists: Vec<AccessControl>,
    /// Hosted backends.
    #[serde(default)]
    pub backends: Vec<RemoteBackend>,
}

impl ServiceSnapshot {
    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid snapshot JSON.
    pub fn load(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("failed to read snippet snapshot '{path}': {e}"))?;
        serde_json::from_str(&text)
            .map_err(|e| miette::miette!("invalid snippet snapshot '{path}': {e}"))
    }
}

impl SnippetProvider for ServiceSnapshot {
    fn dictionaries(&self, _version: i64) -> Result<Vec<EdgeDictionary>> {
        Ok(self.dictionaries.clone())
    }

    fn access_lists(&self, _version: i64) -> Result<Vec<AccessControl>> {
        Ok(self.access_lists.clone())
    }

    fn backends(&self, _version: i64) -> Result<Vec<RemoteBackend>> {
        Ok(self.backends.clone())
    }
}

/// An accumulated set of rendered VCL fragments.
#[derive(Debug, Default)]
pub struct SnippetSet {
    snippets: Vec<String>,
}

impl SnippetSet {
    /// Fetches every hosted entity for a service version and renders each as
    /// a VCL fragment.
    ///
    /// # Errors
    ///
    /// Propagates the first provider fetch error; nothing is rendered or
    /// linted in that case.
    pub fn fetch(provider: &dyn SnippetProvider, version: i64) -> Result<Self> {
        let mut set = Self::default();

        let dictionaries = provider.dictionaries(version)?;
        info!(count = dictionaries.len(), "fetched edge dictionaries");
        for dictionary in &dictionaries {
            set.snippets.push(render_table(dictionary));
        }

        let access_lists = provider.access_lists(version)?;
        info!(count = access_lists.len(), "fetched access control lists");
        for acl in &access_lists {
            set.snippets.push(render_acl(acl));
        }

        let backends = provider.backends(version)?;
        info!(count = backends.len(), "fetched backends");
        for backend in &backends {
            set.snippets.push(render_backend(backend));
        }
        for director in shield_directors(&backends) {
            set.snippets.push(director);
        }

        Ok(set)
    }

    /// Appends local source text after the fetched fragments.
    pub fn push_source(&mut self, source: impl Into<String>) {
        self.snippets.push(source.into());
    }

    /// Returns all fragments joined into one source text, in fetch order.
    #[must_use]
    pub fn combined_source(&self) -> String {
        self.snippets.join("\n")
    }

    /// Lints all accumulated fragments as one combined pass.
    ///
    /// # Errors
    ///
    /// Returns the fatal error when any fragment fails to lex or parse; an
    /// early fragment's syntax error aborts the whole combined pass.
    pub fn check(&self, strict: bool) -> Result<Vec<Diagnostic>, SourceError> {
        let combined = self.combined_source();
        let mut context = Context::new();
        check_source(&combined, &mut context, strict)
    }

    /// Returns the rendered fragments, in fetch order.
    #[must_use]
    pub fn snippets(&self) -> &[String] {
        &self.snippets
    }
}

/// Renders a hosted dictionary as a `table` declaration.
fn render_table(dictionary: &EdgeDictionary) -> String {
    let mut out = format!("table {} {{\n", dictionary.name);
    for item in &dictionary.items {
        let _ = writeln!(out, "  \"{}\": \"{}\",", item.key, item.value);
    }
    out.push('}');
    out
}

/// Renders a hosted ACL as an `acl` declaration.
fn render_acl(acl: &AccessControl) -> String {
    let mut out = format!("acl {} {{\n", acl.name);
    for entry in &acl.entries {
        out.push_str("  ");
        if entry.negated {
            out.push('!');
        }
        let _ = write!(out, "\"{}\"", entry.ip);
        if let Some(subnet) = entry.subnet {
            let _ = write!(out, "/{subnet}");
        }
        out.push(';');
        if let Some(comment) = &entry.comment {
            let _ = write!(out, "  # {comment}");
        }
        out.push('\n');
    }
    out.push('}');
    out
}

/// Renders a hosted backend as an empty `backend` declaration.
///
/// The provider manages the real origin properties; the declaration only
/// needs to exist so references to it resolve.
fn render_backend(backend: &RemoteBackend) -> String {
    format!("backend F_{} {{ .host = \"{}\"; }}", backend.name, backend.name)
}

/// Synthesizes one director per distinct shield site.
///
/// Each director needs at least one member, so an arbitrary fetched backend
/// is picked to keep the declaration resolvable.
fn shield_directors(backends: &[RemoteBackend]) -> Vec<String> {
    let Some(first) = backends.first() else {
        return Vec::new();
    };
    let member = format!("F_{}", first.name);

    let mut shields: Vec<&str> = backends
        .iter()
        .filter_map(|backend| backend.shield.as_deref())
        .collect();
    shields.sort_unstable();
    shields.dedup();

    shields
        .into_iter()
        .map(|shield| {
            let name = format!("ssl_shield_{}", shield.replace('-', "_"));
            format!(
                "director {name} {} {{\n  {{ .backend = {member}; .weight = 1; }}\n}}",
                DirectorType::Random.as_str()
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubProvider;

    impl SnippetProvider for StubProvider {
        fn dictionaries(&self, _version: i64) -> Result<Vec<EdgeDictionary>> {
            Ok(vec![EdgeDictionary {
                name: "redirects".into(),
                items: vec![DictionaryItem {
                    key: "/old".into(),
                    value: "/new".into(),
                }],
            }])
        }

        fn access_lists(&self, _version: i64) -> Result<Vec<AccessControl>> {
            Ok(vec![AccessControl {
                name: "internal".into(),
                entries: vec![AclEntry {
                    ip: "10.0.0.0".into(),
                    subnet: Some(8),
                    negated: false,
                    comment: Some("office range".into()),
                }],
            }])
        }

        fn backends(&self, _version: i64) -> Result<Vec<RemoteBackend>> {
            Ok(vec![
                RemoteBackend {
                    name: "origin_a".into(),
                    shield: Some("lhr-london".into()),
                },
                RemoteBackend {
                    name: "origin_b".into(),
                    shield: Some("lhr-london".into()),
                },
            ])
        }
    }

    #[test]
    fn rendered_table_parses() {
        let rendered = render_table(&EdgeDictionary {
            name: "redirects".into(),
            items: vec![DictionaryItem {
                key: "/old".into(),
                value: "/new".into(),
            }],
        });
        assert_eq!(rendered, "table redirects {\n  \"/old\": \"/new\",\n}");
    }

    #[test]
    fn rendered_acl_carries_negation_mask_and_comment() {
        let rendered = render_acl(&AccessControl {
            name: "internal".into(),
            entries: vec![AclEntry {
                ip: "192.0.2.1".into(),
                subnet: Some(24),
                negated: true,
                comment: Some("blocked".into()),
            }],
        });
        assert_eq!(
            rendered,
            "acl internal {\n  !\"192.0.2.1\"/24;  # blocked\n}"
        );
    }

    #[test]
    fn shield_directors_are_deduplicated() {
        let backends = vec![
            RemoteBackend {
                name: "a".into(),
                shield: Some("lhr-london".into()),
            },
            RemoteBackend {
                name: "b".into(),
                shield: Some("lhr-london".into()),
            },
            RemoteBackend {
                name: "c".into(),
                shield: None,
            },
        ];
        let directors = shield_directors(&backends);
        assert_eq!(directors.len(), 1);
        assert!(directors[0].contains("director ssl_shield_lhr_london random"));
        assert!(directors[0].contains(".backend = F_a;"));
    }

    #[test]
    fn fetched_set_lints_cleanly_as_one_pass() {
        let set = SnippetSet::fetch(&StubProvider, 42).unwrap();
        // dictionary + acl + two backends + one shield director
        assert_eq!(set.snippets().len(), 5);
        let diagnostics = set.check(true).unwrap();
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn local_source_joins_the_combined_pass() {
        let mut set = SnippetSet::fetch(&StubProvider, 42).unwrap();
        set.push_source(
            "sub vcl_recv {\n  if (client.ip ~ internal) {\n    set req.http.Location = table.lookup(redirects, req.url, \"/\");\n  }\n}",
        );
        let diagnostics = set.check(true).unwrap();
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn early_fragment_syntax_error_fails_the_whole_pass() {
        let mut set = SnippetSet::default();
        set.push_source("table broken {");
        set.push_source("sub vcl_recv { restart; }");
        assert!(set.check(false).is_err());
    }

    #[test]
    fn dictionary_model_round_trips_through_json() {
        let dictionary = EdgeDictionary {
            name: "redirects".into(),
            items: vec![DictionaryItem {
                key: "/old".into(),
                value: "/new".into(),
            }],
        };
        let json = serde_json::to_string(&dictionary).unwrap();
        let back: EdgeDictionary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dictionary);
    }
}
