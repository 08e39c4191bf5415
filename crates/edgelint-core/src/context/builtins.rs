// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Seed data for the semantic context: the predefined-variable table and the
//! builtin function registry.
//!
//! These tables are produced ahead of time from the language reference and
//! loaded once at [`Context`](super::Context) creation. The analyzer treats
//! them as data, not behavior — malformed entries here are a programming
//! invariant violation, not a user-facing error.

use super::{
    BuiltinFunction, ExtraBehavior, FunctionSpec, ScopeSet, Type, VariableSpec, Variables,
};
use super::Scope;

/// Phases where backend-request variables (`bereq.*`) exist.
const BACKEND_REQ: ScopeSet = Scope::Miss
    .mask()
    .union(Scope::Pass.mask())
    .union(Scope::Fetch.mask());

/// Phases where the cached object (`obj.*`) exists.
const OBJECT: ScopeSet = Scope::Hit.mask().union(Scope::Error.mask());

/// Shorthand for a variable spec.
const fn var(ty: Type, read: ScopeSet, write: ScopeSet) -> VariableSpec {
    VariableSpec { ty, read, write }
}

/// Shorthand for a read-only variable spec.
const fn read_only(ty: Type, read: ScopeSet) -> VariableSpec {
    VariableSpec {
        ty,
        read,
        write: ScopeSet::NONE,
    }
}

/// Builds the predefined-variable table.
pub(super) fn predefined_variables() -> Variables {
    let mut variables = Variables::new();
    let request = ScopeSet::REQUEST;
    let fetch = Scope::Fetch.mask();
    let deliver = Scope::Deliver.mask();
    let error = Scope::Error.mask();

    // Connection.
    variables.insert("client.ip", read_only(Type::Ip, request));
    variables.insert("client.port", read_only(Type::Integer, request));
    variables.insert("server.ip", read_only(Type::Ip, request));
    variables.insert("server.port", read_only(Type::Integer, request));
    variables.insert("server.hostname", read_only(Type::String, request));
    variables.insert("client.geo.country_code", read_only(Type::String, request));
    variables.insert("req.is_ssl", read_only(Type::Bool, request));

    // Request.
    variables.insert("req.url", var(Type::String, request, request));
    variables.insert("req.method", var(Type::String, request, request));
    variables.insert("req.proto", read_only(Type::String, request));
    variables.insert("req.backend", var(Type::Backend, request, Scope::Recv.mask()));
    variables.insert("req.restarts", read_only(Type::Integer, request));
    variables.insert("req.xid", read_only(Type::String, request));
    variables.insert(
        "req.hash",
        var(Type::String, Scope::Hash.mask(), Scope::Hash.mask()),
    );
    variables.insert(
        "req.grace",
        var(Type::RTime, request, Scope::Recv.mask()),
    );

    // Backend request / response.
    variables.insert("bereq.url", var(Type::String, BACKEND_REQ, BACKEND_REQ));
    variables.insert("bereq.method", var(Type::String, BACKEND_REQ, BACKEND_REQ));
    variables.insert("beresp.status", var(Type::Integer, fetch, fetch));
    variables.insert("beresp.response", var(Type::String, fetch, fetch));
    variables.insert("beresp.ttl", var(Type::RTime, fetch, fetch));
    variables.insert("beresp.grace", var(Type::RTime, fetch, fetch));
    variables.insert("beresp.cacheable", var(Type::Bool, fetch, fetch));

    // Delivery.
    variables.insert("resp.status", var(Type::Integer, deliver, deliver));
    variables.insert("resp.response", var(Type::String, deliver, deliver));
    variables.insert("resp.is_locally_generated", read_only(Type::Bool, deliver));

    // Cached object.
    variables.insert("obj.status", var(Type::Integer, OBJECT, error));
    variables.insert("obj.response", var(Type::String, OBJECT, error));
    variables.insert("obj.ttl", var(Type::RTime, OBJECT, OBJECT));
    variables.insert("obj.grace", var(Type::RTime, OBJECT, OBJECT));
    variables.insert(
        "obj.hits",
        read_only(Type::Integer, Scope::Hit.mask().union(deliver)),
    );

    // Time.
    variables.insert("now", read_only(Type::Time, ScopeSet::ALL));

    // Regex capture groups: integer-typed, dynamically valued, reset to
    // zero at the start of each match context. The linter models the reset
    // as a used-before-match warning.
    variables.insert("re.group.0", read_only(Type::Integer, request));
    variables.insert("re.group.1", read_only(Type::Integer, request));
    variables.insert("re.group.2", read_only(Type::Integer, request));
    variables.insert("re.group.3", read_only(Type::Integer, request));
    variables.insert("re.group.4", read_only(Type::Integer, request));
    variables.insert("re.group.5", read_only(Type::Integer, request));
    variables.insert("re.group.6", read_only(Type::Integer, request));
    variables.insert("re.group.7", read_only(Type::Integer, request));
    variables.insert("re.group.8", read_only(Type::Integer, request));
    variables.insert("re.group.9", read_only(Type::Integer, request));
    variables.insert("re.group.10", read_only(Type::Integer, request));

    // Header wildcards: any name under these prefixes is a string header.
    variables.insert_prefix("req.http.", var(Type::String, request, request));
    variables.insert_prefix("bereq.http.", var(Type::String, BACKEND_REQ, BACKEND_REQ));
    variables.insert_prefix(
        "beresp.http.",
        var(Type::String, fetch, fetch),
    );
    variables.insert_prefix(
        "resp.http.",
        var(Type::String, deliver.union(Scope::Log.mask()), deliver),
    );
    variables.insert_prefix("obj.http.", var(Type::String, OBJECT, error));

    variables
}

/// Shorthand for a builtin function entry.
const fn func(
    arguments: &'static [&'static [Type]],
    ret: Type,
    scopes: ScopeSet,
) -> BuiltinFunction {
    BuiltinFunction {
        arguments,
        ret,
        scopes,
        extra: None,
        is_user_defined: false,
    }
}

const STRING1: &[&[Type]] = &[&[Type::String]];
const STRING2: &[&[Type]] = &[&[Type::String], &[Type::String]];
const STRING3: &[&[Type]] = &[&[Type::String], &[Type::String], &[Type::String]];
const FLOAT1: &[&[Type]] = &[&[Type::Float]];
const FLOAT2: &[&[Type]] = &[&[Type::Float], &[Type::Float]];
const INTEGER1: &[&[Type]] = &[&[Type::Integer]];

/// Builds the builtin function registry.
pub(super) fn builtin_functions() -> FunctionSpec {
    let mut functions = FunctionSpec::new();
    let all = ScopeSet::ALL;
    let request = ScopeSet::REQUEST;

    // String utilities.
    functions.insert("std.tolower", func(STRING1, Type::String, all));
    functions.insert("std.toupper", func(STRING1, Type::String, all));
    functions.insert("std.strlen", func(STRING1, Type::Integer, all));
    functions.insert("std.strstr", func(STRING2, Type::String, all));
    functions.insert("std.prefixof", func(STRING2, Type::Bool, all));
    functions.insert("std.suffixof", func(STRING2, Type::Bool, all));
    functions.insert("std.replace", func(STRING3, Type::String, all));
    functions.insert("std.replaceall", func(STRING3, Type::String, all));

    // Conversions.
    functions.insert("std.atoi", func(STRING1, Type::Integer, all));
    functions.insert("std.atof", func(STRING1, Type::Float, all));
    functions.insert("std.itoa", func(INTEGER1, Type::String, all));
    functions.insert(
        "std.integer2time",
        func(INTEGER1, Type::Time, all),
    );
    functions.insert(
        "std.time",
        func(&[&[Type::String], &[Type::Time]], Type::Time, all),
    );

    // Regular expressions.
    functions.insert("regsub", func(STRING3, Type::String, all));
    functions.insert("regsuball", func(STRING3, Type::String, all));
    functions.insert("subfield", func(STRING3, Type::String, all));

    // Encoding.
    functions.insert("urlencode", func(STRING1, Type::String, all));
    functions.insert("urldecode", func(STRING1, Type::String, all));
    functions.insert("digest.base64", func(STRING1, Type::String, all));
    functions.insert("digest.base64_decode", func(STRING1, Type::String, all));
    functions.insert("digest.hash_sha256", func(STRING1, Type::String, all));
    functions.insert(
        "digest.hash_md5",
        BuiltinFunction {
            extra: Some(ExtraBehavior::DeprecationNotice(
                "MD5 is cryptographically broken; use digest.hash_sha256",
            )),
            ..func(STRING1, Type::String, all)
        },
    );

    // Math.
    functions.insert("math.floor", func(FLOAT1, Type::Float, all));
    functions.insert("math.ceil", func(FLOAT1, Type::Float, all));
    functions.insert("math.pow", func(FLOAT2, Type::Float, all));

    // Tables.
    functions.insert(
        "table.lookup",
        func(
            &[&[Type::Table], &[Type::String], &[Type::String]],
            Type::String,
            all,
        ),
    );
    functions.insert(
        "table.contains",
        func(&[&[Type::Table], &[Type::String]], Type::Bool, all),
    );

    // Miscellaneous.
    functions.insert("randombool", func(FLOAT1, Type::Bool, all));
    functions.insert(
        "http_status_matches",
        func(&[&[Type::Integer], &[Type::String]], Type::Bool, all),
    );
    functions.insert(
        "h2.push",
        BuiltinFunction {
            extra: Some(ExtraBehavior::ProviderVersionGate { min_version: 60 }),
            ..func(STRING1, Type::String, request)
        },
    );

    functions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_prefixes_resolve() {
        let variables = predefined_variables();
        for name in [
            "req.http.Host",
            "bereq.http.Accept",
            "beresp.http.Cache-Control",
            "resp.http.Content-Type",
            "obj.http.Age",
        ] {
            let spec = variables
                .lookup(name)
                .unwrap_or_else(|| panic!("{name} should resolve"));
            assert_eq!(spec.ty, Type::String, "{name}");
        }
    }

    #[test]
    fn deliver_only_variable_masks() {
        let variables = predefined_variables();
        let status = variables.lookup("resp.status").unwrap();
        assert!(status.read.contains(Scope::Deliver));
        assert!(!status.read.contains(Scope::Recv));
        assert!(status.write.contains(Scope::Deliver));
        assert!(!status.write.contains(Scope::Fetch));
    }

    #[test]
    fn deprecated_builtin_carries_notice() {
        let functions = builtin_functions();
        let md5 = functions.lookup("digest.hash_md5").unwrap();
        assert!(matches!(
            md5.extra,
            Some(ExtraBehavior::DeprecationNotice(_))
        ));
        // The non-deprecated sibling carries nothing.
        let sha = functions.lookup("digest.hash_sha256").unwrap();
        assert!(sha.extra.is_none());
    }

    #[test]
    fn version_gated_builtin() {
        let functions = builtin_functions();
        let push = functions.lookup("h2.push").unwrap();
        assert!(matches!(
            push.extra,
            Some(ExtraBehavior::ProviderVersionGate { min_version: 60 })
        ));
        assert!(!push.scopes.contains(Scope::Init));
    }

    #[test]
    fn table_lookup_signature() {
        let functions = builtin_functions();
        let lookup = functions.lookup("table.lookup").unwrap();
        assert_eq!(lookup.arguments.len(), 3);
        assert_eq!(lookup.arguments[0], &[Type::Table]);
        assert_eq!(
            lookup.signature("table.lookup"),
            "table.lookup(TABLE, STRING, STRING) -> STRING"
        );
    }
}
