//! Semantic Table Registry: a static partitioning of the store's finding and
//! context tables, used by the FCE to decide which context tables to pull
//! when assembling a bundle for a given file extension, and to keep the
//! "is this a finding or context" distinction explicit rather than
//! inferred from naming conventions.
//!
//! `RISK_SOURCES` and every `CONTEXT_*` set below must be pairwise
//! disjoint — this is asserted by `registry_sets_are_disjoint` below and
//! re-checked by [`super::Store::open`] at startup.

/// Tables whose rows are findings (facts about a problem, not context).
pub const RISK_SOURCES: &[&str] = &[
    "findings_consolidated",
    "taint_flows",
    "python_security_findings",
    "cdk_findings",
    "terraform_findings",
    "graphql_findings_cache",
    "framework_taint_patterns",
];

/// Process/history-derived context: churn, authorship, release cadence.
pub const CONTEXT_PROCESS: &[&str] = &[
    "process_commits",
    "process_file_churn",
    "process_author_ownership",
    "process_hotfile_history",
    "process_blame_summary",
    "process_release_tags",
    "process_issue_links",
    "process_ci_runs",
    "process_pr_reviews",
];

/// Structural/CFG-derived context: complexity, centrality, cycles.
pub const CONTEXT_STRUCTURAL: &[&str] = &[
    "structural_cfg_blocks",
    "structural_cfg_edges",
    "structural_cyclomatic",
    "structural_cognitive",
    "structural_centrality",
    "structural_cycles",
    "structural_call_depth",
    "structural_dead_code",
    "structural_fan_in_out",
    "structural_maintainability",
    "structural_god_objects",
];

/// Per-framework detail tables (routes, components, models, ...), one
/// cluster per entry in [`crate::framework::registry::FRAMEWORK_REGISTRY`]
/// plus related ecosystem facts (ORM, GraphQL) that span frameworks.
pub const CONTEXT_FRAMEWORK: &[&str] = &[
    "django_models",
    "django_views",
    "django_urls",
    "django_middleware",
    "django_signals",
    "flask_routes",
    "flask_blueprints",
    "flask_extensions",
    "fastapi_routes",
    "fastapi_dependencies",
    "fastapi_models",
    "react_components",
    "react_hooks",
    "react_props",
    "vue_components",
    "vue_props",
    "vue_directives",
    "angular_components",
    "angular_services",
    "angular_modules",
    "express_routes",
    "express_middleware",
    "axum_routes",
    "axum_extractors",
    "actix_routes",
    "actix_handlers",
    "graphql_schemas",
    "graphql_resolvers",
    "graphql_mutations",
    "orm_models",
    "orm_migrations",
    "orm_relations",
    "docker_services",
    "docker_images",
    "gin_routes",
    "gin_middleware",
    "zod_schemas",
    "joi_schemas",
    "yup_schemas",
    "ajv_schemas",
    "class_validator_rules",
    "jest_suites",
    "pytest_fixtures",
];

/// Security-specific context: sanitizer/validator call sites, crypto usage,
/// auth checks — consulted by the taint tracker's sanitizer lookup and the
/// FCE's context bundles.
pub const CONTEXT_SECURITY: &[&str] = &[
    "secrets_findings_cache",
    "crypto_usage",
    "auth_checks",
    "cors_policies",
    "csrf_tokens",
    "input_validation",
    "sanitizer_calls",
    "sql_query_sites",
    "command_exec_sites",
    "path_traversal_sites",
    "ssrf_sites",
    "deserialization_sites",
    "jwt_usage",
    "session_management",
    "rate_limit_configs",
];

/// Language-specific facts not already covered by a framework cluster.
pub const CONTEXT_LANGUAGE: &[&str] = &[
    "python_imports_detail",
    "python_decorators",
    "python_type_hints",
    "python_dunder_methods",
    "python_comprehensions",
    "go_packages",
    "go_interfaces",
    "go_goroutines",
    "rust_traits",
    "rust_macros",
    "rust_unsafe_blocks",
    "bash_scripts",
    "bash_env_vars",
    "typescript_interfaces",
    "typescript_generics",
    "javascript_closures",
];

/// All context-category slices, for iteration.
fn context_categories() -> [(&'static str, &'static [&'static str]); 5] {
    [
        ("process", CONTEXT_PROCESS),
        ("structural", CONTEXT_STRUCTURAL),
        ("framework", CONTEXT_FRAMEWORK),
        ("security", CONTEXT_SECURITY),
        ("language", CONTEXT_LANGUAGE),
    ]
}

/// Selects the context tables relevant to a file extension, per the
/// `.py → python_*`, `.tsx → react_* ∪ angular_* ∪ vue_* ∪ graphql_* ∪ orm_*`
/// style of rule. Unknown extensions return an empty, not a wildcard, set.
/// Results are deduplicated and sorted.
#[must_use]
pub fn tables_for_extension(ext: &str) -> Vec<&'static str> {
    let prefixes: &[&str] = match ext.trim_start_matches('.') {
        "py" => &["python_", "django_", "flask_", "fastapi_", "pytest_"],
        "go" => &["go_", "gin_"],
        "rs" => &["rust_", "axum_", "actix_"],
        "tsx" | "jsx" => &[
            "react_", "angular_", "vue_", "graphql_", "orm_", "typescript_", "javascript_",
        ],
        "ts" => &["typescript_", "express_", "orm_", "graphql_"],
        "js" | "mjs" | "cjs" => &["javascript_", "express_", "zod_", "joi_", "yup_", "ajv_"],
        "vue" => &["vue_"],
        "sh" | "bash" => &["bash_"],
        "tf" => &["terraform"],
        "yml" | "yaml" => &["docker_"],
        _ => &[],
    };
    if prefixes.is_empty() {
        return Vec::new();
    }

    let mut all_tables: Vec<&'static str> = Vec::new();
    for (_, tables) in context_categories() {
        all_tables.extend(tables.iter().copied());
    }

    let mut matched: Vec<&'static str> = all_tables
        .into_iter()
        .filter(|t| prefixes.iter().any(|p| t.starts_with(p)))
        .collect();
    matched.sort_unstable();
    matched.dedup();
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    #[test]
    fn registry_sets_are_disjoint() {
        let all_sets: Vec<&[&str]> = vec![
            RISK_SOURCES,
            CONTEXT_PROCESS,
            CONTEXT_STRUCTURAL,
            CONTEXT_FRAMEWORK,
            CONTEXT_SECURITY,
            CONTEXT_LANGUAGE,
        ];
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for set in all_sets {
            for table in set {
                assert!(seen.insert(table), "table '{table}' appears in more than one set");
            }
        }
    }

    #[test]
    fn python_extension_selects_python_clusters_only() {
        let tables = tables_for_extension(".py");
        assert!(tables.contains(&"python_decorators"));
        assert!(tables.contains(&"django_models"));
        assert!(!tables.contains(&"react_components"));
    }

    #[test]
    fn tsx_extension_unions_multiple_clusters() {
        let tables = tables_for_extension(".tsx");
        assert!(tables.contains(&"react_components"));
        assert!(tables.contains(&"vue_components"));
        assert!(tables.contains(&"graphql_schemas"));
        assert!(tables.contains(&"orm_models"));
    }

    #[test]
    fn unknown_extension_yields_empty_set() {
        assert!(tables_for_extension(".xyz").is_empty());
    }

    #[test]
    fn result_is_deduplicated_and_sorted() {
        let tables = tables_for_extension(".py");
        let mut sorted = tables.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(tables, sorted);
    }
}
