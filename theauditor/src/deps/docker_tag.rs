//! Semantic parsing of Docker image tags: `(major, minor, patch)`,
//! stability class, and variant suffix. Upgrade comparison operates on the
//! numeric triple alone and never crosses variants.

use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stability {
    Dev,
    Alpha,
    Beta,
    Rc,
    Stable,
}

/// A decomposed Docker tag, e.g. `node:18.2.0-alpine` ->
/// `{ major: 18, minor: 2, patch: 0, stability: Stable, variant: "alpine" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerTag {
    pub raw: String,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub patch: Option<u32>,
    pub stability: Stability,
    pub variant: Option<String>,
}

impl DockerTag {
    #[must_use]
    pub fn version_triple(&self) -> Option<(u32, u32, u32)> {
        Some((self.major?, self.minor.unwrap_or(0), self.patch.unwrap_or(0)))
    }

    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !matches!(self.stability, Stability::Stable)
    }
}

fn numeric_re() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| {
        regex::Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?").expect("valid regex")
    })
}

/// Variant suffixes recognized as OS/distribution markers rather than part
/// of the version or stability class.
const KNOWN_VARIANTS: &[&str] = &[
    "alpine",
    "slim",
    "bookworm",
    "bullseye",
    "buster",
    "jammy",
    "focal",
    "windowsservercore",
    "nanoserver",
];

/// Parses a raw tag string (the part after `:` in `image:tag`) into its
/// semantic components.
#[must_use]
pub fn parse_tag(tag: &str) -> DockerTag {
    let lower = tag.to_lowercase();
    let parts: Vec<&str> = lower.split('-').collect();

    let version_part = parts.first().copied().unwrap_or("");
    let (major, minor, patch) = numeric_re()
        .captures(version_part)
        .map(|c| {
            let major = c.get(1).and_then(|m| m.as_str().parse().ok());
            let minor = c.get(2).and_then(|m| m.as_str().parse().ok());
            let patch = c.get(3).and_then(|m| m.as_str().parse().ok());
            (major, minor, patch)
        })
        .unwrap_or((None, None, None));

    let mut stability = Stability::Stable;
    let mut variant = None;

    for part in &parts[1.min(parts.len())..] {
        if let Some(known) = KNOWN_VARIANTS.iter().find(|v| *v == part) {
            variant = Some((*known).to_owned());
            continue;
        }
        match *part {
            "alpha" => stability = Stability::Alpha,
            "beta" => stability = Stability::Beta,
            "rc" => stability = Stability::Rc,
            "dev" | "nightly" | "edge" | "canary" => stability = Stability::Dev,
            _ if part.starts_with("rc") && part[2..].chars().all(|c| c.is_ascii_digit()) => {
                stability = Stability::Rc;
            }
            _ => {}
        }
    }
    // `latest`, `edge` and friends carry no numeric component; parsing them
    // still succeeds with `major: None`, which `version_triple` surfaces as
    // "not comparable" rather than as an error.
    if version_part == "latest" {
        stability = Stability::Stable;
    }

    DockerTag { raw: tag.to_owned(), major, minor, patch, stability, variant }
}

/// True if `candidate` is a valid upgrade over `current`: strictly greater
/// version triple, same variant (or both variant-less), and excluding
/// pre-release tags unless `allow_prerelease` is set.
#[must_use]
pub fn is_upgrade(current: &DockerTag, candidate: &DockerTag, allow_prerelease: bool) -> bool {
    if candidate.variant != current.variant {
        return false;
    }
    if candidate.is_prerelease() && !allow_prerelease {
        return false;
    }
    match (current.version_triple(), candidate.version_triple()) {
        (Some(cur), Some(cand)) => cand > cur,
        _ => false,
    }
}
