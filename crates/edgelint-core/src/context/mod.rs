// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The semantic context: types, scopes, predefined variables, builtin
//! functions, and per-pass declaration registries.
//!
//! A [`Context`] is created once per lint pass, pre-seeded with language
//! data (predefined variables and builtin function signatures, static data
//! produced ahead of time from the language reference — see
//! [`builtins`](self)). The linter then enriches it with user declarations
//! as it discovers them. The seeded portion is read-only after construction;
//! the declaration registries are mutable for the duration of one pass.
//!
//! A `Context` is exclusively owned by one lint-pass invocation. When
//! several accumulated snippets are linted together, the caller threads the
//! same `Context` value through one combined pass — there is no implicit
//! global state, and the type is not safe for concurrent mutation.

mod builtins;

use std::collections::HashMap;

use ecow::EcoString;

use crate::source_analysis::Span;

/// A primitive value type of the configuration language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Character string.
    String,
    /// 64-bit integer.
    Integer,
    /// Floating-point number.
    Float,
    /// Boolean.
    Bool,
    /// IP address.
    Ip,
    /// Absolute time.
    Time,
    /// Relative time (duration).
    RTime,
    /// Reference to a declared backend.
    Backend,
    /// Reference to a declared ACL.
    Acl,
    /// Reference to a declared table.
    Table,
    /// A bare identifier argument (e.g. a return state name).
    Id,
    /// Unresolved; produced when checking could not determine a type and
    /// compatible with everything, so one mistake is reported once.
    Any,
}

impl Type {
    /// Resolves a `declare local` / `table` type name.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        let ty = match name {
            "STRING" => Self::String,
            "INTEGER" => Self::Integer,
            "FLOAT" => Self::Float,
            "BOOL" => Self::Bool,
            "IP" => Self::Ip,
            "TIME" => Self::Time,
            "RTIME" => Self::RTime,
            "BACKEND" => Self::Backend,
            "ACL" => Self::Acl,
            _ => return None,
        };
        Some(ty)
    }

    /// Returns `true` for types arithmetic operators accept.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float | Self::Any)
    }

    /// Returns `true` for types that coerce to a string by formatting in
    /// concatenation position. Booleans, ACLs and tables do not.
    #[must_use]
    pub const fn is_string_coercible(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Integer
                | Self::Float
                | Self::Ip
                | Self::Time
                | Self::RTime
                | Self::Backend
                | Self::Id
                | Self::Any
        )
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Bool => "BOOL",
            Self::Ip => "IP",
            Self::Time => "TIME",
            Self::RTime => "RTIME",
            Self::Backend => "BACKEND",
            Self::Acl => "ACL",
            Self::Table => "TABLE",
            Self::Id => "ID",
            Self::Any => "ANY",
        };
        write!(f, "{name}")
    }
}

/// An execution phase of the configuration language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Top-level / initialization (outside any subroutine body).
    Init,
    /// Request reception.
    Recv,
    /// Cache-key computation.
    Hash,
    /// Cache hit.
    Hit,
    /// Cache miss.
    Miss,
    /// Cache bypass.
    Pass,
    /// Origin fetch.
    Fetch,
    /// Error synthesis.
    Error,
    /// Response delivery.
    Deliver,
    /// Logging.
    Log,
}

impl Scope {
    /// All phases, in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Init,
        Self::Recv,
        Self::Hash,
        Self::Hit,
        Self::Miss,
        Self::Pass,
        Self::Fetch,
        Self::Error,
        Self::Deliver,
        Self::Log,
    ];

    /// Returns the single-phase bitmask for this scope.
    #[must_use]
    pub const fn mask(self) -> ScopeSet {
        ScopeSet(1 << self as u16)
    }

    /// Resolves the phase implied by a well-known `vcl_*` subroutine name.
    #[must_use]
    pub fn from_subroutine_name(name: &str) -> Option<Self> {
        let scope = match name {
            "vcl_recv" => Self::Recv,
            "vcl_hash" => Self::Hash,
            "vcl_hit" => Self::Hit,
            "vcl_miss" => Self::Miss,
            "vcl_pass" => Self::Pass,
            "vcl_fetch" => Self::Fetch,
            "vcl_error" => Self::Error,
            "vcl_deliver" => Self::Deliver,
            "vcl_log" => Self::Log,
            _ => return None,
        };
        Some(scope)
    }

    /// Resolves a phase annotation word (`recv`, `deliver`, ...) used in
    /// leading comments on custom subroutines.
    #[must_use]
    pub fn from_annotation(word: &str) -> Option<Self> {
        let scope = match word {
            "init" => Self::Init,
            "recv" => Self::Recv,
            "hash" => Self::Hash,
            "hit" => Self::Hit,
            "miss" => Self::Miss,
            "pass" => Self::Pass,
            "fetch" => Self::Fetch,
            "error" => Self::Error,
            "deliver" => Self::Deliver,
            "log" => Self::Log,
            _ => return None,
        };
        Some(scope)
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Recv => "recv",
            Self::Hash => "hash",
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Pass => "pass",
            Self::Fetch => "fetch",
            Self::Error => "error",
            Self::Deliver => "deliver",
            Self::Log => "log",
        };
        write!(f, "{name}")
    }
}

/// A bitmask-composable set of execution phases.
///
/// Predefined variables, builtin functions, and statements are legal in a
/// union of phases; the linter intersects the active phase with these masks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScopeSet(u16);

impl ScopeSet {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// Every phase including init.
    pub const ALL: Self = Self(0b11_1111_1111);
    /// Every request-handling phase (everything except init).
    pub const REQUEST: Self = Self(0b11_1111_1110);

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if the set contains the given phase.
    #[must_use]
    pub const fn contains(self, scope: Scope) -> bool {
        self.0 & (1 << scope as u16) != 0
    }

    /// Returns `true` if the two sets share any phase.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for ScopeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl From<Scope> for ScopeSet {
    fn from(scope: Scope) -> Self {
        scope.mask()
    }
}

impl std::fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for scope in Scope::ALL {
            if self.contains(scope) {
                if !first {
                    write!(f, ", ")?;
                }
                write!(f, "{scope}")?;
                first = false;
            }
        }
        if first {
            write!(f, "(none)")?;
        }
        Ok(())
    }
}

/// The type and legal phases of a predefined variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    /// The variable's type.
    pub ty: Type,
    /// Phases where the variable may be read.
    pub read: ScopeSet,
    /// Phases where the variable may be written; empty means read-only.
    pub write: ScopeSet,
}

/// The predefined-variable table: exact names plus wildcard name prefixes
/// (`req.http.` matches any request header).
#[derive(Debug, Clone)]
pub struct Variables {
    exact: HashMap<&'static str, VariableSpec>,
    prefixes: Vec<(&'static str, VariableSpec)>,
}

impl Variables {
    /// Creates an empty table (populated by the seed data).
    fn new() -> Self {
        Self {
            exact: HashMap::new(),
            prefixes: Vec::new(),
        }
    }

    fn insert(&mut self, name: &'static str, spec: VariableSpec) {
        self.exact.insert(name, spec);
    }

    fn insert_prefix(&mut self, prefix: &'static str, spec: VariableSpec) {
        self.prefixes.push((prefix, spec));
    }

    /// Looks up a variable by exact name, falling back to the longest
    /// matching wildcard prefix.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&VariableSpec> {
        if let Some(spec) = self.exact.get(name) {
            return Some(spec);
        }
        self.prefixes
            .iter()
            .filter(|(prefix, _)| name.starts_with(prefix) && name.len() > prefix.len())
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, spec)| spec)
    }
}

/// A capability understood by the linter beyond the plain signature.
///
/// A closed enumeration rather than an open hook, so checks stay exhaustive
/// and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraBehavior {
    /// The function is deprecated; the message says what to use instead.
    DeprecationNotice(&'static str),
    /// The function requires at least this provider platform version.
    ProviderVersionGate {
        /// Minimum platform version.
        min_version: u32,
    },
}

/// The signature and legality data of one callable function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunction {
    /// Accepted type alternatives per argument position; the outer slice
    /// length is the arity.
    pub arguments: &'static [&'static [Type]],
    /// The return type.
    pub ret: Type,
    /// Phases where calling this function is legal.
    pub scopes: ScopeSet,
    /// Optional extra capability the linter reports on.
    pub extra: Option<ExtraBehavior>,
    /// `true` for subroutines registered during analysis, `false` for
    /// builtins loaded at context creation.
    pub is_user_defined: bool,
}

impl BuiltinFunction {
    /// Renders the expected signature for diagnostics:
    /// `name(STRING, STRING) -> STRING`.
    #[must_use]
    pub fn signature(&self, name: &str) -> String {
        use std::fmt::Write;
        let mut out = String::from(name);
        out.push('(');
        for (i, alternatives) in self.arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            for (j, ty) in alternatives.iter().enumerate() {
                if j > 0 {
                    out.push('|');
                }
                let _ = write!(out, "{ty}");
            }
        }
        let _ = write!(out, ") -> {}", self.ret);
        out
    }
}

/// A node in the dotted-name function registry.
///
/// A name segment may carry a function itself, nested sub-specs, or both —
/// modeling structured names like `math.floor` next to `math.pow`.
#[derive(Debug, Clone, Default)]
pub struct FunctionSpec {
    items: HashMap<EcoString, FunctionSpec>,
    value: Option<BuiltinFunction>,
}

impl FunctionSpec {
    /// Creates an empty registry node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a function under its dotted name, creating intermediate
    /// segments as needed.
    pub fn insert(&mut self, dotted: &str, function: BuiltinFunction) {
        let mut node = self;
        for segment in dotted.split('.') {
            node = node.items.entry(segment.into()).or_default();
        }
        node.value = Some(function);
    }

    /// Resolves a dotted name segment-by-segment.
    #[must_use]
    pub fn lookup(&self, dotted: &str) -> Option<&BuiltinFunction> {
        let mut node = self;
        for segment in dotted.split('.') {
            node = node.items.get(segment)?;
        }
        node.value.as_ref()
    }
}

/// A duplicate-declaration condition from one of the [`Context`] registries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDeclaration {
    /// The registry kind (`"table"`, `"acl"`, ...).
    pub kind: &'static str,
    /// The duplicated name.
    pub name: EcoString,
    /// Where the name was first declared.
    pub first: Span,
}

/// A user-declared subroutine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubroutineInfo {
    /// Where the subroutine was declared.
    pub span: Span,
    /// Phases the body is checked under.
    pub scopes: ScopeSet,
}

/// A `declare local` variable within the current block scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVar {
    /// The variable name (including the `var.` prefix).
    pub name: EcoString,
    /// The declared type.
    pub ty: Type,
    /// Where the variable was declared.
    pub span: Span,
    /// Whether any expression has read the variable.
    pub read: bool,
}

/// The semantic model for one lint pass.
#[derive(Debug, Clone)]
pub struct Context {
    variables: Variables,
    functions: FunctionSpec,
    subroutines: HashMap<EcoString, SubroutineInfo>,
    tables: HashMap<EcoString, (Span, Type)>,
    acls: HashMap<EcoString, Span>,
    backends: HashMap<EcoString, Span>,
    directors: HashMap<EcoString, Span>,
    locals: Vec<HashMap<EcoString, LocalVar>>,
}

impl Context {
    /// Creates a context seeded with the predefined-variable table and the
    /// builtin function registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variables: builtins::predefined_variables(),
            functions: builtins::builtin_functions(),
            subroutines: HashMap::new(),
            tables: HashMap::new(),
            acls: HashMap::new(),
            backends: HashMap::new(),
            directors: HashMap::new(),
            locals: Vec::new(),
        }
    }

    // ========================================================================
    // Read-Only Lookups
    // ========================================================================

    /// Looks up a predefined variable.
    #[must_use]
    pub fn lookup_variable(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.lookup(name)
    }

    /// Looks up a builtin or user-defined function by dotted name.
    #[must_use]
    pub fn lookup_function(&self, dotted: &str) -> Option<&BuiltinFunction> {
        self.functions.lookup(dotted)
    }

    /// Looks up a declared subroutine.
    #[must_use]
    pub fn subroutine(&self, name: &str) -> Option<&SubroutineInfo> {
        self.subroutines.get(name)
    }

    /// Looks up a declared table's value type.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<Type> {
        self.tables.get(name).map(|(_, ty)| *ty)
    }

    /// Returns `true` if the name is a declared ACL.
    #[must_use]
    pub fn has_acl(&self, name: &str) -> bool {
        self.acls.contains_key(name)
    }

    /// Returns `true` if the name is a declared backend.
    #[must_use]
    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Returns `true` if the name is a declared director.
    #[must_use]
    pub fn has_director(&self, name: &str) -> bool {
        self.directors.contains_key(name)
    }

    // ========================================================================
    // Declaration Registries (per-pass mutable)
    // ========================================================================

    /// Registers a subroutine and makes it callable as a user-defined
    /// function.
    ///
    /// # Errors
    ///
    /// Fails if the name is already declared as a subroutine in this pass;
    /// the first registration stands.
    pub fn declare_subroutine(
        &mut self,
        name: &EcoString,
        span: Span,
        scopes: ScopeSet,
    ) -> Result<(), DuplicateDeclaration> {
        if let Some(first) = self.subroutines.get(name) {
            return Err(DuplicateDeclaration {
                kind: "subroutine",
                name: name.clone(),
                first: first.span,
            });
        }
        self.subroutines
            .insert(name.clone(), SubroutineInfo { span, scopes });
        self.functions.insert(
            name,
            BuiltinFunction {
                arguments: &[],
                ret: Type::Any,
                scopes,
                extra: None,
                is_user_defined: true,
            },
        );
        Ok(())
    }

    /// Registers a table with its value type.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate table name; the first registration stands.
    pub fn declare_table(
        &mut self,
        name: &EcoString,
        span: Span,
        value_type: Type,
    ) -> Result<(), DuplicateDeclaration> {
        if let Some((first, _)) = self.tables.get(name) {
            return Err(DuplicateDeclaration {
                kind: "table",
                name: name.clone(),
                first: *first,
            });
        }
        self.tables.insert(name.clone(), (span, value_type));
        Ok(())
    }

    /// Registers an ACL.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate ACL name; the first registration stands.
    pub fn declare_acl(&mut self, name: &EcoString, span: Span) -> Result<(), DuplicateDeclaration> {
        Self::declare_in(&mut self.acls, "acl", name, span)
    }

    /// Registers a backend.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate backend name; the first registration stands.
    pub fn declare_backend(
        &mut self,
        name: &EcoString,
        span: Span,
    ) -> Result<(), DuplicateDeclaration> {
        Self::declare_in(&mut self.backends, "backend", name, span)
    }

    /// Registers a director.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate director name; the first registration stands.
    pub fn declare_director(
        &mut self,
        name: &EcoString,
        span: Span,
    ) -> Result<(), DuplicateDeclaration> {
        Self::declare_in(&mut self.directors, "director", name, span)
    }

    fn declare_in(
        registry: &mut HashMap<EcoString, Span>,
        kind: &'static str,
        name: &EcoString,
        span: Span,
    ) -> Result<(), DuplicateDeclaration> {
        if let Some(first) = registry.get(name) {
            return Err(DuplicateDeclaration {
                kind,
                name: name.clone(),
                first: *first,
            });
        }
        registry.insert(name.clone(), span);
        Ok(())
    }

    // ========================================================================
    // Block-Scoped Locals
    // ========================================================================

    /// Enters a local-variable scope (a subroutine body).
    pub fn push_locals(&mut self) {
        self.locals.push(HashMap::new());
    }

    /// Leaves the current local-variable scope, returning its variables for
    /// unused-local analysis.
    pub fn pop_locals(&mut self) -> Vec<LocalVar> {
        let mut locals: Vec<LocalVar> = self
            .locals
            .pop()
            .map(|level| level.into_values().collect())
            .unwrap_or_default();
        locals.sort_by_key(|local| local.span.start());
        locals
    }

    /// Declares a local variable in the current scope.
    ///
    /// # Errors
    ///
    /// Fails if the name is already declared in the current scope.
    pub fn declare_local(
        &mut self,
        name: &EcoString,
        ty: Type,
        span: Span,
    ) -> Result<(), DuplicateDeclaration> {
        let level = self
            .locals
            .last_mut()
            .expect("declare_local outside any local scope");
        if let Some(first) = level.get(name) {
            return Err(DuplicateDeclaration {
                kind: "local variable",
                name: name.clone(),
                first: first.span,
            });
        }
        level.insert(
            name.clone(),
            LocalVar {
                name: name.clone(),
                ty,
                span,
                read: false,
            },
        );
        Ok(())
    }

    /// Looks up a local variable, innermost scope first.
    #[must_use]
    pub fn lookup_local(&self, name: &str) -> Option<&LocalVar> {
        self.locals.iter().rev().find_map(|level| level.get(name))
    }

    /// Marks a local variable as read.
    pub fn mark_local_read(&mut self, name: &str) {
        for level in self.locals.iter_mut().rev() {
            if let Some(local) = level.get_mut(name) {
                local.read = true;
                return;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_set_composition() {
        let set = Scope::Recv.mask() | Scope::Deliver.mask();
        assert!(set.contains(Scope::Recv));
        assert!(set.contains(Scope::Deliver));
        assert!(!set.contains(Scope::Fetch));
        assert!(set.intersects(ScopeSet::REQUEST));
        assert!(!ScopeSet::NONE.intersects(set));
        assert_eq!(set.to_string(), "recv, deliver");
    }

    #[test]
    fn request_set_excludes_init() {
        assert!(!ScopeSet::REQUEST.contains(Scope::Init));
        assert!(ScopeSet::ALL.contains(Scope::Init));
        for scope in Scope::ALL {
            if scope != Scope::Init {
                assert!(ScopeSet::REQUEST.contains(scope), "{scope} missing");
            }
        }
    }

    #[test]
    fn well_known_subroutine_names() {
        assert_eq!(Scope::from_subroutine_name("vcl_recv"), Some(Scope::Recv));
        assert_eq!(Scope::from_subroutine_name("vcl_log"), Some(Scope::Log));
        assert_eq!(Scope::from_subroutine_name("custom"), None);
    }

    #[test]
    fn variable_exact_beats_prefix() {
        let context = Context::new();
        // Exact entry.
        let url = context.lookup_variable("req.url").unwrap();
        assert_eq!(url.ty, Type::String);
        // Wildcard-prefix entry.
        let header = context.lookup_variable("req.http.X-Custom").unwrap();
        assert_eq!(header.ty, Type::String);
        // The bare prefix itself is not a variable.
        assert!(context.lookup_variable("req.http.").is_none());
        assert!(context.lookup_variable("req.nonsense").is_none());
    }

    #[test]
    fn regex_group_variables_are_integer_typed() {
        let context = Context::new();
        for i in 0..=10 {
            let name = format!("re.group.{i}");
            let spec = context
                .lookup_variable(&name)
                .unwrap_or_else(|| panic!("{name} should be predefined"));
            assert_eq!(spec.ty, Type::Integer);
            assert!(spec.read.contains(Scope::Recv));
            assert!(spec.write.is_empty(), "{name} is read-only");
        }
        assert!(context.lookup_variable("re.group.11").is_none());
    }

    #[test]
    fn builtin_dotted_lookup() {
        let context = Context::new();
        let tolower = context.lookup_function("std.tolower").unwrap();
        assert_eq!(tolower.ret, Type::String);
        assert!(!tolower.is_user_defined);
        assert_eq!(tolower.signature("std.tolower"), "std.tolower(STRING) -> STRING");

        assert!(context.lookup_function("std.does_not_exist").is_none());
        // A bare intermediate segment is not itself a function.
        assert!(context.lookup_function("std").is_none());
    }

    #[test]
    fn duplicate_table_declaration_reports_first_span() {
        let mut context = Context::new();
        let name = EcoString::from("redirects");
        context
            .declare_table(&name, Span::new(0, 10), Type::String)
            .unwrap();
        let err = context
            .declare_table(&name, Span::new(20, 30), Type::String)
            .unwrap_err();
        assert_eq!(err.kind, "table");
        assert_eq!(err.first, Span::new(0, 10));
        // The first registration stands.
        assert_eq!(context.table("redirects"), Some(Type::String));
    }

    #[test]
    fn subroutine_registration_creates_user_function() {
        let mut context = Context::new();
        let name = EcoString::from("purge_check");
        context
            .declare_subroutine(&name, Span::new(0, 5), ScopeSet::REQUEST)
            .unwrap();
        let function = context.lookup_function("purge_check").unwrap();
        assert!(function.is_user_defined);
        assert_eq!(function.ret, Type::Any);
    }

    #[test]
    fn locals_scope_lifecycle() {
        let mut context = Context::new();
        context.push_locals();
        let name = EcoString::from("var.count");
        context
            .declare_local(&name, Type::Integer, Span::new(5, 14))
            .unwrap();
        assert!(context.lookup_local("var.count").is_some());
        assert!(!context.lookup_local("var.count").unwrap().read);

        context.mark_local_read("var.count");
        assert!(context.lookup_local("var.count").unwrap().read);

        let drained = context.pop_locals();
        assert_eq!(drained.len(), 1);
        assert!(drained[0].read);
        assert!(context.lookup_local("var.count").is_none());
    }

    #[test]
    fn duplicate_local_is_rejected() {
        let mut context = Context::new();
        context.push_locals();
        let name = EcoString::from("var.x");
        context
            .declare_local(&name, Type::String, Span::new(0, 5))
            .unwrap();
        let err = context
            .declare_local(&name, Type::Integer, Span::new(10, 15))
            .unwrap_err();
        assert_eq!(err.kind, "local variable");
    }
}
