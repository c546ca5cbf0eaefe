use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

#[allow(clippy::expect_used)]
static FROM_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*from\s+(\.*[A-Za-z_][\w.]*|\.+)\s+import\s")
        .expect("from-import pattern is valid")
});
#[allow(clippy::expect_used)]
static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+([A-Za-z_][\w.]*(?:\s*,\s*[A-Za-z_][\w.]*)*)")
        .expect("import pattern is valid")
});

/// Dotted modules and packages provided by a set of artifact paths
#[derive(Debug, Default)]
pub struct ModuleIndex {
    modules: BTreeSet<String>,
    roots: BTreeSet<String>,
}

impl ModuleIndex {
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = ModuleIndex::default();
        for path in paths {
            let Some(module) = module_name(path) else {
                continue;
            };
            let segments: Vec<&str> = module.split('.').collect();
            for end in 1..=segments.len() {
                index.modules.insert(segments[..end].join("."));
            }
            if let Some(root) = segments.first() {
                index.roots.insert((*root).to_string());
            }
        }
        index
    }

    /// Unresolvable imports of one artifact, as written
    ///
    /// Only imports rooted in a package of the artifact set are judged;
    /// third-party and standard library imports are skipped.
    pub fn unresolved(&self, path: &str, source: &str) -> Vec<String> {
        let package = package_of(path);
        let mut missing = Vec::new();
        for line in source.lines() {
            if let Some(caps) = FROM_IMPORT_RE.captures(line) {
                let target = &caps[1];
                if let Some(module) = absolute(target, &package) {
                    if self.is_local(&module) && !self.modules.contains(&module) {
                        missing.push(target.to_string());
                    }
                } else {
                    missing.push(target.to_string());
                }
            } else if let Some(caps) = IMPORT_RE.captures(line) {
                for target in caps[1].split(',').map(str::trim) {
                    if self.is_local(target) && !self.modules.contains(target) {
                        missing.push(target.to_string());
                    }
                }
            }
        }
        missing
    }

    fn is_local(&self, module: &str) -> bool {
        module
            .split('.')
            .next()
            .is_some_and(|root| self.roots.contains(root))
    }
}

/// Resolve a possibly relative import against the importing package
fn absolute(target: &str, package: &[String]) -> Option<String> {
    let level = target.chars().take_while(|c| *c == '.').count();
    if level == 0 {
        return Some(target.to_string());
    }
    if level > package.len() {
        return None;
    }
    let mut parts: Vec<String> = package[..package.len() + 1 - level].to_vec();
    let rest = &target[level..];
    if !rest.is_empty() {
        parts.extend(rest.split('.').map(str::to_string));
    }
    Some(parts.join("."))
}

/// Dotted module for a `.py` path (`app/api/__init__.py` → `app.api`)
pub fn module_name(path: &str) -> Option<String> {
    let stem = path.strip_suffix(".py")?;
    let stem = stem.strip_suffix("/__init__").unwrap_or(stem);
    if stem.is_empty() || stem == "__init__" {
        return None;
    }
    Some(stem.replace('/', "."))
}

/// Package segments a module lives in
fn package_of(path: &str) -> Vec<String> {
    let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
    segments.pop();
    segments
}
