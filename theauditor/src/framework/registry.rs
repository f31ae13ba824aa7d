//! Static catalog mapping framework names to detection rules.
//!
//! Each entry is pure data: it names the manifest files to look at, how to
//! interpret each one, and (optionally) the import patterns or file markers
//! that let the detector fall back to source inspection when a manifest
//! alone isn't conclusive. Nothing here touches the filesystem; see
//! [`super::detector`] for that.

/// How a single manifest file should be consulted for a given framework.
#[derive(Debug, Clone)]
pub enum DetectionSource {
    /// Descend into one of these dotted key paths (TOML/JSON-ish manifests).
    /// A `*` path segment means "every key at that level".
    KeyPaths(&'static [&'static [&'static str]]),
    /// Substring match against the raw file contents, with a regex pulling
    /// a version out when present.
    ContentSearch,
    /// Per-line text match, for `requirements.txt`-style files with no
    /// structured syntax.
    LineSearch,
    /// Mere presence of the file is the detection (e.g. `manage.py`).
    Exists,
}

/// One row of the framework catalog.
#[derive(Debug, Clone)]
pub struct FrameworkEntry {
    /// Canonical framework name, e.g. `"django"`.
    pub name: &'static str,
    /// Primary implementation language.
    pub language: &'static str,
    /// `(manifest_file_name, how_to_read_it)` pairs. A framework may be
    /// looked for in more than one manifest (e.g. `pyproject.toml` and
    /// `requirements.txt`).
    pub detection_sources: &'static [(&'static str, DetectionSource)],
    /// Actual package identifier, when it differs from `name` (e.g. the
    /// `joi` entry also matches the scoped `@hapi/joi` package).
    pub package_pattern: Option<&'static str>,
    /// Source substrings that indicate usage even without a manifest hit.
    pub import_patterns: &'static [&'static str],
    /// Filenames whose mere presence strongly implies this framework.
    pub file_markers: &'static [&'static str],
    /// Category tag. `"validation"` entries double as the taint tracker's
    /// sanitizer catalog (see [`crate::taint::sinks`]).
    pub category: Option<&'static str>,
}

const PY_DEPENDENCY_PATHS: &[&[&str]] = &[
    &["project", "dependencies"],
    &["tool", "poetry", "dependencies"],
    &["tool", "poetry", "group", "*", "dependencies"],
    &["tool", "pdm", "dependencies"],
    &["project", "optional-dependencies", "*"],
];

const PY_MANIFEST_SOURCES: &[(&str, DetectionSource)] = &[
    ("pyproject.toml", DetectionSource::KeyPaths(PY_DEPENDENCY_PATHS)),
    ("requirements.txt", DetectionSource::LineSearch),
    ("requirements-dev.txt", DetectionSource::LineSearch),
    ("setup.py", DetectionSource::ContentSearch),
];

const JS_MANIFEST_SOURCES: &[(&str, DetectionSource)] = &[(
    "package.json",
    DetectionSource::KeyPaths(&[&["dependencies"], &["devDependencies"]]),
)];

/// The complete framework catalog, one entry per supported framework.
///
/// Grouped roughly by ecosystem; order has no semantic meaning beyond
/// readability — detection iterates the whole table regardless of position.
pub static FRAMEWORK_REGISTRY: &[FrameworkEntry] = &[
    FrameworkEntry {
        name: "django",
        language: "python",
        detection_sources: PY_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from django", "import django"],
        file_markers: &["manage.py", "wsgi.py"],
        category: None,
    },
    FrameworkEntry {
        name: "flask",
        language: "python",
        detection_sources: PY_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from flask", "import flask"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "fastapi",
        language: "python",
        detection_sources: PY_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from fastapi", "import fastapi"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "pydantic",
        language: "python",
        detection_sources: PY_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from pydantic", "import pydantic"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "pytest",
        language: "python",
        detection_sources: PY_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["import pytest", "from pytest"],
        file_markers: &["conftest.py", "pytest.ini"],
        category: Some("test"),
    },
    FrameworkEntry {
        name: "react",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from 'react'", "require('react')"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "vue",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from 'vue'", "require('vue')"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "angular",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: Some("@angular/core"),
        import_patterns: &["from '@angular/core'"],
        file_markers: &["angular.json"],
        category: None,
    },
    FrameworkEntry {
        name: "express",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["require('express')", "from 'express'"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "zod",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from 'zod'", "import { z }", "import * as z from 'zod'"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "joi",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: Some("joi"),
        import_patterns: &["require('joi')", "from 'joi'", "import Joi"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "yup",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from 'yup'", "import * as yup"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "ajv",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["require('ajv')", "from 'ajv'", "new Ajv"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "class-validator",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from 'class-validator'"],
        file_markers: &[],
        category: Some("validation"),
    },
    FrameworkEntry {
        name: "jest",
        language: "javascript",
        detection_sources: JS_MANIFEST_SOURCES,
        package_pattern: None,
        import_patterns: &["from '@jest/globals'"],
        file_markers: &["jest.config.js", "jest.config.ts"],
        category: Some("test"),
    },
    FrameworkEntry {
        name: "actix-web",
        language: "rust",
        detection_sources: &[(
            "Cargo.toml",
            DetectionSource::KeyPaths(&[&["dependencies"], &["workspace", "dependencies"]]),
        )],
        package_pattern: None,
        import_patterns: &["use actix_web"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "axum",
        language: "rust",
        detection_sources: &[(
            "Cargo.toml",
            DetectionSource::KeyPaths(&[&["dependencies"], &["workspace", "dependencies"]]),
        )],
        package_pattern: None,
        import_patterns: &["use axum"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "gin",
        language: "go",
        detection_sources: &[("go.mod", DetectionSource::ContentSearch)],
        package_pattern: Some("github.com/gin-gonic/gin"),
        import_patterns: &["gin-gonic/gin"],
        file_markers: &[],
        category: None,
    },
    FrameworkEntry {
        name: "docker-compose",
        language: "yaml",
        detection_sources: &[
            ("docker-compose.yml", DetectionSource::Exists),
            ("docker-compose.yaml", DetectionSource::Exists),
        ],
        package_pattern: None,
        import_patterns: &[],
        file_markers: &[],
        category: None,
    },
];

/// Looks up every registry entry whose `name` or `package_pattern` matches.
#[must_use]
pub fn find_entry(name: &str) -> Option<&'static FrameworkEntry> {
    FRAMEWORK_REGISTRY
        .iter()
        .find(|e| e.name == name || e.package_pattern == Some(name))
}

/// All entries tagged with the given category (e.g. `"validation"`).
#[must_use]
pub fn entries_in_category(category: &str) -> Vec<&'static FrameworkEntry> {
    FRAMEWORK_REGISTRY
        .iter()
        .filter(|e| e.category == Some(category))
        .collect()
}
