//! Build configuration: what to call the output binary, how to invoke
//! the compiler, and any artifacts declared directly rather than
//! discovered by scanning.

use crate::fs::FileSystem;
use crate::scanner::{ParseResult, Scanner};
use crate::smallmap::SmallMap;
use anyhow::{anyhow, bail};

/// Filename looked for in the working directory when no configuration
/// file is named on the command line.  The file may be absent, in which
/// case the built-in defaults apply.
pub const DEFAULT_FILENAME: &str = "ccsimplebuild.conf";

/// An artifact declared directly in configuration: the literal paths it
/// depends on, and the compiler arguments (appended after the shared
/// prefix) that produce it.
#[derive(Debug)]
pub struct ExplicitDep {
    pub dep_paths: Vec<String>,
    pub suffix: String,
}

#[derive(Debug)]
pub struct Config {
    pub output_binary: String,
    pub compile_prefix: String,
    /// Trailing linker flags, e.g. "-latomic -lcurl".
    pub libraries: String,
    /// Keyed by artifact path, in declaration order.
    pub explicit_deps: SmallMap<String, ExplicitDep>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            output_binary: "default_ccsimplebuild_output".to_string(),
            compile_prefix: "g++".to_string(),
            libraries: String::new(),
            explicit_deps: SmallMap::new(),
        }
    }
}

/// Read configuration from the named file, or from DEFAULT_FILENAME when
/// none was given.  A file named on the command line must exist; the
/// default file may be absent.
pub fn load(fs: &dyn FileSystem, arg: Option<&str>) -> anyhow::Result<Config> {
    let (filename, required) = match arg {
        Some(name) => (name, true),
        None => (DEFAULT_FILENAME, false),
    };
    let bytes = match fs.read(filename) {
        Ok(bytes) => bytes,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::NotFound && !required {
                return Ok(Config::default());
            }
            bail!("read {}: {}", filename, err);
        }
    };
    parse(filename, bytes)
}

/// Parse configuration text.  The format is line-oriented and fixed:
/// three KEY=value lines in order, then zero or more four-line
/// ExplicitDependency blocks.  Blank lines and leading indentation are
/// insignificant; anything else out of place is a fatal error.
pub fn parse(filename: &str, mut bytes: Vec<u8>) -> anyhow::Result<Config> {
    bytes.push(0);
    let mut parser = Parser {
        scanner: Scanner::new(&bytes),
    };
    parser
        .read_config()
        .map_err(|err| anyhow!(parser.scanner.format_parse_error(filename, err)))
}

struct Parser<'text> {
    scanner: Scanner<'text>,
}

impl<'text> Parser<'text> {
    fn read_config(&mut self) -> ParseResult<Config> {
        let mut config = Config::default();
        config.output_binary = self.expect_kv("OutputBinaryFilename")?.trim().to_string();
        config.compile_prefix = self.expect_kv("CompileCommandPrefix")?;
        config.libraries = self.expect_kv("LibrariesToLink")?;
        loop {
            if !self.skip_to_content() {
                break;
            }
            self.expect_word("ExplicitDependency")?;
            self.scanner.expect(':')?;
            let after_colon = self.scanner.ofs;
            let trailing = self.read_rest_of_line();
            if !trailing.trim().is_empty() {
                self.scanner.ofs = after_colon;
                return self
                    .scanner
                    .parse_error("unexpected text after ExplicitDependency:");
            }
            let output = self.expect_kv("Output")?.trim().to_string();
            let suffix = self.expect_kv("CompileSuffix")?;
            let depends = self.expect_kv("DependsOn")?;
            config.explicit_deps.insert(
                output,
                ExplicitDep {
                    dep_paths: split_paths(&depends),
                    suffix,
                },
            );
        }
        Ok(config)
    }

    /// Advance to the next significant character: skips blank lines and
    /// leading indentation.  Returns false at end of input.
    fn skip_to_content(&mut self) -> bool {
        loop {
            match self.scanner.peek() {
                '\0' => return false,
                ' ' | '\t' | '\r' | '\n' => self.scanner.next(),
                _ => return true,
            }
        }
    }

    /// Expect the line under the cursor to be `key`=value; returns the
    /// literal value text.
    fn expect_kv(&mut self, key: &str) -> ParseResult<String> {
        if !self.skip_to_content() {
            return self
                .scanner
                .parse_error(format!("expected {}=..., got end of file", key));
        }
        self.expect_word(key)?;
        self.scanner.expect('=')?;
        Ok(self.read_rest_of_line())
    }

    /// Consume the literal key name under the cursor.
    fn expect_word(&mut self, word: &str) -> ParseResult<()> {
        let start = self.scanner.ofs;
        while self.scanner.peek().is_ascii_alphabetic() {
            self.scanner.next();
        }
        if self.scanner.slice(start, self.scanner.ofs) != word.as_bytes() {
            self.scanner.ofs = start;
            return self.scanner.parse_error(format!("expected {:?}", word));
        }
        Ok(())
    }

    /// The remainder of the current line, consuming the newline.
    fn read_rest_of_line(&mut self) -> String {
        let start = self.scanner.ofs;
        loop {
            match self.scanner.peek() {
                '\n' | '\0' => break,
                _ => self.scanner.next(),
            }
        }
        let mut end = self.scanner.ofs;
        if self.scanner.peek() == '\n' {
            self.scanner.next();
        }
        if end > start && self.scanner.slice(end - 1, end) == b"\r" {
            end -= 1;
        }
        String::from_utf8_lossy(self.scanner.slice(start, end)).into_owned()
    }
}

/// Split a DependsOn value: comma-separated, items trimmed, empties
/// dropped.
fn split_paths(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
