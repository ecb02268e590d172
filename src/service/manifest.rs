//! Pip-style dependency manifest (`requirements.txt`).
//!
//! Only the shape of each entry is checked here; version resolution belongs to
//! the installer.

use crate::error::BootstrapError;
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

const OPERATORS: [&str; 8] = ["===", "==", "!=", "~=", ">=", "<=", ">", "<"];
const ARCHIVE_SUFFIXES: [&str; 6] = [".whl", ".tar.gz", ".tar.bz2", ".tar.xz", ".tgz", ".zip"];

/// One `name[extras]constraint; marker` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub extras: Vec<String>,
    pub constraint: Option<String>,
    pub marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Package(Package),
    /// Local path or URL, handed to the installer as written.
    Direct(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub source: Source,
    /// Per-entry installer options such as `--hash=sha256:...`.
    pub options: Vec<String>,
}

impl Requirement {
    pub fn package(&self) -> Option<&Package> {
        match &self.source {
            Source::Package(p) => Some(p),
            Source::Direct(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub requirements: Vec<Requirement>,
    /// Installer options such as `-r base.txt` or `--index-url ...`, passed through untouched.
    pub directives: Vec<String>,
}

impl Manifest {
    pub async fn load(path: &Path) -> Result<Self, BootstrapError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                BootstrapError::ManifestMissing {
                    path: path.to_path_buf(),
                }
            } else {
                BootstrapError::ManifestRead {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::parse(path, &contents)
    }

    pub fn parse(path: &Path, contents: &str) -> Result<Self, BootstrapError> {
        let mut requirements = Vec::new();
        let mut directives = Vec::new();

        for (line, entry) in logical_lines(contents) {
            let entry = strip_comment(&entry).trim().to_string();
            if entry.is_empty() {
                continue;
            }
            if entry.starts_with('-') {
                directives.push(entry);
                continue;
            }
            let req = parse_entry(&entry).map_err(|reason| {
                BootstrapError::ManifestMalformed {
                    line,
                    entry: entry.clone(),
                    reason,
                }
            })?;
            requirements.push(req);
        }

        Ok(Self {
            path: path.to_path_buf(),
            requirements,
            directives,
        })
    }

    /// Nothing to install: no packages and no directives that could pull any in.
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty() && self.directives.is_empty()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::Package(p) => write!(f, "{p}")?,
            Source::Direct(location) => f.write_str(location)?,
        }
        for opt in &self.options {
            write!(f, " {opt}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(c) = &self.constraint {
            if c.starts_with('@') {
                write!(f, " {c}")?;
            } else {
                f.write_str(c)?;
            }
        }
        if let Some(m) = &self.marker {
            write!(f, "; {m}")?;
        }
        Ok(())
    }
}

/// Joins `\`-continued lines; yields (1-based starting line, text).
fn logical_lines(contents: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in contents.lines().enumerate() {
        let (start, mut buf) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                buf.push_str(head);
                pending = Some((start, buf));
            }
            None => {
                buf.push_str(raw);
                out.push((start, buf));
            }
        }
    }
    if let Some(rest) = pending {
        out.push(rest);
    }
    out
}

fn strip_comment(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return "";
    }
    // `#` only opens a comment after whitespace; URLs may carry fragments.
    line.char_indices()
        .find(|&(i, c)| c == '#' && i > 0 && line[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| &line[..i])
        .unwrap_or(line)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match (chars.next(), name.chars().last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && name.chars().all(is_name_char)
        }
        _ => false,
    }
}

fn parse_entry(entry: &str) -> Result<Requirement, &'static str> {
    let (body, options) = split_options(entry);
    check_options(&options)?;
    let source = if is_direct_reference(body) {
        parse_direct(body)?
    } else {
        Source::Package(parse_package(body)?)
    };
    Ok(Requirement { source, options })
}

/// Splits trailing `--option` tokens off an entry.
fn split_options(entry: &str) -> (&str, Vec<String>) {
    let cut = entry
        .char_indices()
        .find(|&(i, _)| entry[i..].starts_with("--") && entry[..i].ends_with(char::is_whitespace))
        .map(|(i, _)| i);
    match cut {
        Some(i) => (
            entry[..i].trim_end(),
            entry[i..].split_whitespace().map(str::to_string).collect(),
        ),
        None => (entry, Vec::new()),
    }
}

fn check_options(options: &[String]) -> Result<(), &'static str> {
    for opt in options {
        if let Some(value) = opt.strip_prefix("--hash=") {
            match value.split_once(':') {
                Some((algo, digest)) if !algo.is_empty() && !digest.is_empty() => {}
                _ => return Err("hash must be written as `algorithm:digest`"),
            }
        }
    }
    Ok(())
}

fn is_direct_reference(body: &str) -> bool {
    let head = body
        .split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or(body);
    head.contains("://")
        || head.starts_with("file:")
        || head.starts_with(['.', '/', '~'])
        || head.contains(['/', '\\'])
        || ARCHIVE_SUFFIXES.iter().any(|suffix| head.ends_with(suffix))
}

fn parse_direct(body: &str) -> Result<Source, &'static str> {
    let head = body
        .split(|c: char| c.is_whitespace() || c == ';')
        .next()
        .unwrap_or(body);
    if head.contains("://") || head.starts_with("file:") {
        Url::parse(head).map_err(|_| "invalid URL")?;
    }
    Ok(Source::Direct(body.to_string()))
}

fn parse_package(entry: &str) -> Result<Package, &'static str> {
    let name_len = entry
        .find(|c: char| !is_name_char(c))
        .unwrap_or(entry.len());
    let name = &entry[..name_len];
    if !is_valid_name(name) {
        return Err("invalid package name");
    }

    let mut rest = entry[name_len..].trim_start();
    let mut extras = Vec::new();
    if let Some(inner) = rest.strip_prefix('[') {
        let close = inner.find(']').ok_or("unterminated extras")?;
        for extra in inner[..close].split(',').map(str::trim) {
            if !is_valid_name(extra) {
                return Err("invalid extra name");
            }
            extras.push(extra.to_string());
        }
        rest = inner[close + 1..].trim_start();
    }

    let mut marker = None;
    if let Some(idx) = rest.find(';') {
        let m = rest[idx + 1..].trim();
        if m.is_empty() {
            return Err("empty environment marker");
        }
        marker = Some(m.to_string());
        rest = rest[..idx].trim();
    }

    let constraint = parse_constraint(rest.trim())?;

    Ok(Package {
        name: name.to_string(),
        extras,
        constraint,
        marker,
    })
}

fn parse_constraint(spec: &str) -> Result<Option<String>, &'static str> {
    if spec.is_empty() {
        return Ok(None);
    }
    if let Some(url) = spec.strip_prefix('@') {
        if url.trim().is_empty() {
            return Err("missing URL after `@`");
        }
        return Ok(Some(format!("@ {}", url.trim())));
    }

    let spec = spec
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(spec);

    let mut clauses = Vec::new();
    for clause in spec.split(',').map(str::trim) {
        let op = OPERATORS
            .iter()
            .find(|op| clause.starts_with(**op))
            .ok_or("version constraint must start with a comparison operator")?;
        let version = clause[op.len()..].trim();
        if version.is_empty() || version.contains(char::is_whitespace) {
            return Err("missing or invalid version");
        }
        clauses.push(format!("{op}{version}"));
    }
    Ok(Some(clauses.join(",")))
}
