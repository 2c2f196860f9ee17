//! Scanning C++ sources for `#include "..."` directives.

use crate::scanner::Scanner;

const INCLUDE_PREFIX: &str = "#include \"";

/// Collect the quoted include paths from a source file, in order of
/// appearance.  Only double-quoted includes name files in the project;
/// angle-bracket includes are system headers and are ignored.  There is
/// no preprocessor awareness, so a directive inside a comment or string
/// literal still counts; matching is byte-literal, including the single
/// space before the opening quote.
pub fn scan(scanner: &mut Scanner) -> Vec<String> {
    let mut includes = Vec::new();
    loop {
        match scanner.peek() {
            '\0' => return includes,
            '#' => {
                if let Some(path) = read_include(scanner) {
                    includes.push(path);
                }
            }
            _ => scanner.next(),
        }
    }
}

/// Attempt to read one `#include "path"` at the cursor.  Returns None
/// when the text is not a complete non-empty quoted include; the quote
/// must close before the end of the line.
fn read_include(scanner: &mut Scanner) -> Option<String> {
    for expected in INCLUDE_PREFIX.chars() {
        if scanner.peek() != expected {
            return None;
        }
        scanner.next();
    }
    let start = scanner.ofs;
    loop {
        match scanner.peek() {
            '"' => break,
            '\n' | '\0' => return None,
            _ => scanner.next(),
        }
    }
    let end = scanner.ofs;
    scanner.next();
    if end == start {
        return None;
    }
    Some(String::from_utf8_lossy(scanner.slice(start, end)).into_owned())
}
