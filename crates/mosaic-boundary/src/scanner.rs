//! Statement-level scanner for TypeScript module sources
//!
//! Comments are blanked first (line breaks kept so line numbers survive),
//! then `import` declarations and `export` forms are picked up with regexes.
//! Dynamic `import()` calls are not module boundaries and are ignored.

use std::sync::LazyLock;

use regex::Regex;

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)(?:^|;)[ \t]*import\s+(type\s+)?(?:([\w$*{}\s,]+?)\s+from\s*)?["']([^"'\n]+)["']"#)
        .expect("import regex")
});

static EXPORT_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bexport\s+(?:declare\s+)?(?:async\s+)?(?:abstract\s+)?(?:function\s*\*?|class|const|let|var|type|interface|enum)\s+([A-Za-z_$][\w$]*)",
    )
    .expect("export declaration regex")
});

static EXPORT_DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bexport\s+default\b").expect("export default regex"));

static EXPORT_CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+(?:type\s+)?\{([^}]*)\}").expect("export clause regex")
});

static EXPORT_STAR_AS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bexport\s+\*\s+as\s+([A-Za-z_$][\w$]*)").expect("export star regex")
});

/// `imported as local` binding of a named import
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub imported: String,
    pub local: String,
}

/// One `import` declaration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportDecl {
    /// 1-based line of the `import` keyword
    pub line: usize,
    pub specifier: String,
    pub default: Option<String>,
    pub named: Vec<NamedImport>,
    pub namespace: Option<String>,
    pub type_only: bool,
}

impl ImportDecl {
    /// `import "x"`: no bindings at all
    pub fn is_side_effect(&self) -> bool {
        self.default.is_none() && self.named.is_empty() && self.namespace.is_none()
    }
}

/// A `/` opens a regex literal at the start or after one of these; otherwise it divides.
///
/// Regexes after keywords such as `return` are read as division.
fn opens_regex(prev: Option<char>) -> bool {
    prev.map_or(true, |c| "(,=:[!&|?{};".contains(c))
}

/// Blank `//` and `/* */` comments, leaving string and regex literals and line breaks intact
pub fn strip_comments(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '/' if next == Some('/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    if chars[i] == '\n' {
                        out.push('\n');
                    }
                    i += 1;
                }
                i += 2;
                out.push(' ');
            }
            '/' if opens_regex(out.trim_end().chars().last()) => {
                out.push(c);
                i += 1;
                let mut in_class = false;
                while i < chars.len() && chars[i] != '\n' {
                    let ch = chars[i];
                    out.push(ch);
                    i += 1;
                    match ch {
                        '\\' if i < chars.len() && chars[i] != '\n' => {
                            out.push(chars[i]);
                            i += 1;
                        }
                        '[' => in_class = true,
                        ']' => in_class = false,
                        '/' if !in_class => break,
                        _ => {}
                    }
                }
            }
            '"' | '\'' | '`' => {
                out.push(c);
                i += 1;
                while i < chars.len() && chars[i] != c {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        out.push(chars[i]);
                        i += 1;
                    }
                    out.push(chars[i]);
                    i += 1;
                }
                if i < chars.len() {
                    out.push(c);
                    i += 1;
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// All static `import` declarations, in source order
pub fn scan_imports(source: &str) -> Vec<ImportDecl> {
    let stripped = strip_comments(source);
    IMPORT_RE
        .captures_iter(&stripped)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = whole.start() + whole.as_str().find("import")?;
            let mut decl = ImportDecl {
                line: line_of(&stripped, keyword),
                specifier: caps.get(3)?.as_str().to_string(),
                type_only: caps.get(1).is_some(),
                ..Default::default()
            };
            if let Some(clause) = caps.get(2) {
                parse_clause(clause.as_str(), &mut decl);
            }
            Some(decl)
        })
        .collect()
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

fn parse_clause(clause: &str, decl: &mut ImportDecl) {
    let (head, named) = match (clause.find('{'), clause.find('}')) {
        (Some(open), Some(close)) if open < close => (&clause[..open], Some(&clause[open + 1..close])),
        _ => (clause, None),
    };

    for part in head.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_prefix('*') {
            Some(rest) => {
                let local = rest.trim().trim_start_matches("as").trim();
                decl.namespace = Some(local.to_string());
            }
            None => decl.default = Some(part.to_string()),
        }
    }

    if let Some(named) = named {
        decl.named = named
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
                match item.split_once(" as ") {
                    Some((imported, local)) => NamedImport {
                        imported: imported.trim().to_string(),
                        local: local.trim().to_string(),
                    },
                    None => NamedImport {
                        imported: item.to_string(),
                        local: item.to_string(),
                    },
                }
            })
            .collect();
    }
}

/// Exported names of a module, in source order and de-duplicated.
///
/// `export default` yields `default`; `export { a as b }` yields `b`.
pub fn scan_exports(source: &str) -> Vec<String> {
    let stripped = strip_comments(source);
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in EXPORT_DECL_RE.captures_iter(&stripped) {
        if let Some(name) = caps.get(1) {
            found.push((name.start(), name.as_str().to_string()));
        }
    }
    for m in EXPORT_DEFAULT_RE.find_iter(&stripped) {
        found.push((m.start(), mosaic_types::DEFAULT_EXPORT.to_string()));
    }
    for caps in EXPORT_STAR_AS_RE.captures_iter(&stripped) {
        if let Some(name) = caps.get(1) {
            found.push((name.start(), name.as_str().to_string()));
        }
    }
    for caps in EXPORT_CLAUSE_RE.captures_iter(&stripped) {
        let Some(list) = caps.get(1) else {
            continue;
        };
        for item in list.as_str().split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let item = item.strip_prefix("type ").map(str::trim).unwrap_or(item);
            let exported = match item.split_once(" as ") {
                Some((_, exported)) => exported.trim(),
                None => item,
            };
            found.push((list.start(), exported.to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);
    let mut names: Vec<String> = Vec::new();
    for (_, name) in found {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
