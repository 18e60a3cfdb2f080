use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use editor::{Command as EditCommand, Editor, EditorConfig, EditorError, MixedSelectionPolicy};
use richtext::{Mark, Selection, is_valid};

/// Frontmatter of a `.test.md` file. The Markdown body below it seeds the document.
#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Selection every command runs against. Defaults to a caret at `0:0:0`.
    #[serde(default = "default_select")]
    pub select: String,

    /// Commands applied in order: mark names, `code`, `paragraph`, `undo`, `redo`.
    #[serde(default)]
    pub commands: Vec<String>,

    /// Mixed-selection policy for mark toggles.
    #[serde(default)]
    pub policy: MixedSelectionPolicy,

    /// Expected serialized HTML after all commands (trimmed comparison).
    #[serde(default)]
    pub expect_html: Option<String>,

    /// Expected command error; its Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If true, the Markdown body is expected to fail to import.
    #[serde(default)]
    pub expect_parse_error: bool,

    /// Expected `is_mark_active` answers for the selection, keyed by mark name.
    #[serde(default)]
    pub expect_active: BTreeMap<String, bool>,

    /// Whether the final document must pass structural validation.
    #[serde(default = "default_true")]
    pub expect_valid: bool,
}

fn default_select() -> String {
    "0:0:0".to_string()
}

fn default_true() -> bool {
    true
}

/// Split a `.test.md` file into its TOML config and Markdown body.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix("\r\n")
        .or_else(|| after_open.strip_prefix('\n'))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..];
    let body = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, body))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Ok(content) => match parse_test_file(&content) {
            Ok((config, body)) => {
                let description = config.description.clone();
                (description, evaluate(&config, body))
            }
            Err(e) => (None, Err(format!("frontmatter error: {}", e))),
        },
        Err(e) => (None, Err(format!("cannot read file: {}", e))),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Ok(()) => TestOutcome::Pass,
            Err(reason) => TestOutcome::Fail(reason),
        },
    }
}

/// Check one test case. `Err` carries the failure reason.
fn evaluate(config: &TestConfig, body: &str) -> Result<(), String> {
    let parsed = richtext::parser::Parser::new(body.to_string(), 0).parse();

    if config.expect_parse_error {
        return match parsed {
            Err(_) => Ok(()),
            Ok(_) => Err("expected import error, but import succeeded".into()),
        };
    }

    let document = match parsed {
        Ok(parsed) => parsed.document,
        Err(errs) => {
            let msgs: Vec<String> = errs.iter().map(|e| e.kind.to_string()).collect();
            return Err(format!("unexpected import error: {}", msgs.join("; ")));
        }
    };

    let selection: Selection = config
        .select
        .parse()
        .map_err(|e| format!("bad `select`: {}", e))?;

    let editor_config = EditorConfig {
        mixed_selection: config.policy,
        ..EditorConfig::default()
    };
    let mut editor = Editor::with_document(document, editor_config)
        .map_err(|e| format!("seed document rejected: {}", e))?;

    let applied = apply_all(&mut editor, &selection, &config.commands);

    match (&config.expect_error, applied) {
        (Some(expected), Err(actual)) => {
            let actual = actual.to_string();
            if !actual.contains(expected.as_str()) {
                return Err(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, actual
                ));
            }
        }
        (Some(expected), Ok(())) => {
            return Err(format!(
                "expected error containing \"{}\", but every command succeeded",
                expected
            ));
        }
        (None, Err(actual)) => return Err(format!("unexpected command error: {}", actual)),
        (None, Ok(())) => {}
    }

    if let Some(expected) = &config.expect_html {
        let actual = editor.html();
        if actual.trim() != expected.trim() {
            return Err(format!(
                "html mismatch\n  expected: {}\n  actual:   {}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    for (name, expected) in &config.expect_active {
        let mark: Mark = name
            .parse()
            .map_err(|e| format!("bad `expect_active` key: {}", e))?;
        let actual = editor.is_mark_active(&selection, mark);
        if actual != *expected {
            return Err(format!(
                "expected {} active = {}, got {}",
                mark, expected, actual
            ));
        }
    }

    let valid = is_valid(editor.document());
    if valid != config.expect_valid {
        return Err(format!(
            "expected document validity {}, got {}",
            config.expect_valid, valid
        ));
    }

    Ok(())
}

fn apply_all(
    editor: &mut Editor,
    selection: &Selection,
    commands: &[String],
) -> Result<(), EditorError> {
    for name in commands {
        let command: EditCommand = name.parse()?;
        editor.apply(selection, command)?;
    }
    Ok(())
}

/// Discover `.test.md` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".test.md"))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(cat), files.len());
    }
}

/// Pick the categories to run. Requested names match a category or any of its
/// subcategories; an empty request selects everything.
fn select_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for request in requested {
        let req = request.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                selected.insert(cat.as_str(), files);
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    selected
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }

    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }

    fn header(&self, text: &str) -> String {
        self.paint(text, "1")
    }
}

/// Run all `.test.md` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no .test.md files found in {}", path.display());
            return 1;
        }
        let selected = select_categories(&all, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(cat, files)| (cat.to_string(), files.clone()))
            .collect()
    };

    let single = path.is_file();
    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, files) in &groups {
        if !single {
            eprintln!();
            eprintln!("{}", style.header(category_label(category)));
        }
        for file in files {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            style.paint("ok", "32"),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("FAILED", "31"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOLD_CASE: &str = "---\n\
        description = \"bold a mixed range\"\n\
        select = \"0:0:0..0:1:3\"\n\
        commands = [\"bold\"]\n\
        expect_html = \"<p><strong>a</strong><strong>b</strong></p>\"\n\
        expect_active = { bold = true, italic = false }\n\
        ---\n\
        **a**b\n";

    #[test]
    fn frontmatter_splits_from_body() {
        let (config, body) = parse_test_file(BOLD_CASE).unwrap();
        assert_eq!(config.description.as_deref(), Some("bold a mixed range"));
        assert_eq!(config.commands, vec!["bold"]);
        assert_eq!(config.policy, MixedSelectionPolicy::ActivateUnlessUnanimous);
        assert!(config.expect_valid);
        assert_eq!(body, "**a**b\n");
    }

    #[test]
    fn missing_frontmatter_is_reported() {
        let err = parse_test_file("# no frontmatter").err().unwrap();
        assert!(err.contains("opening ---"));
    }

    #[test]
    fn evaluate_passes_and_fails() {
        let (config, body) = parse_test_file(BOLD_CASE).unwrap();
        assert_eq!(evaluate(&config, body), Ok(()));

        let (config, _) = parse_test_file(BOLD_CASE).unwrap();
        let reason = evaluate(&config, "plain\n").unwrap_err();
        assert!(reason.starts_with("html mismatch"), "{}", reason);
    }

    #[test]
    fn expected_errors_match_by_substring() {
        let case = "---\ncommands = [\"link\"]\nexpect_error = \"cannot be toggled\"\n---\ntext\n";
        let (config, body) = parse_test_file(case).unwrap();
        assert_eq!(evaluate(&config, body), Ok(()));
    }

    #[test]
    fn runs_a_directory_of_cases() {
        let dir = tempfile::tempdir().unwrap();
        let marks = dir.path().join("marks");
        std::fs::create_dir(&marks).unwrap();
        std::fs::write(marks.join("bold.test.md"), BOLD_CASE).unwrap();
        std::fs::write(
            dir.path().join("broken.test.md"),
            "---\nexpect_html = \"<p>nope</p>\"\n---\nyes\n",
        )
        .unwrap();

        let categories = discover_categorized(dir.path());
        assert_eq!(categories.keys().collect::<Vec<_>>(), vec!["", "marks"]);

        assert_eq!(run_tests(dir.path(), true, &["marks".to_string()]), 0);
        assert_eq!(run_tests(dir.path(), true, &[]), 1);
        assert_eq!(run_tests(&marks.join("bold.test.md"), true, &[]), 0);
    }
}
