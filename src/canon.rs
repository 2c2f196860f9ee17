//! Path canonicalization and the shell-safety allow-list.

/// Lexically canonicalize a path, removing redundant components.
/// Does not access the disk, but only simplifies things like
/// "./foo" => "foo" and "foo/../bar" => "bar".
/// Nodes are keyed by name, so an include of "./util.h" and a scanned
/// "util.h" must canonicalize to the same string.
pub fn canon_path<T: Into<String>>(inpath: T) -> String {
    let path: String = inpath.into();
    let bytes = path.as_bytes();
    let mut out = String::with_capacity(path.len());
    // Offsets into `out` where each kept component starts, so ".." can
    // drop back to the previous one.
    let mut components: Vec<usize> = Vec::new();

    let mut ofs = 0;
    if bytes.first() == Some(&b'/') {
        out.push('/');
        ofs = 1;
    }
    while ofs < bytes.len() {
        let end = bytes[ofs..]
            .iter()
            .position(|&c| c == b'/')
            .map(|p| ofs + p)
            .unwrap_or(bytes.len());
        let has_sep = end < bytes.len();
        match &path[ofs..end] {
            "" | "." => {}
            ".." => match components.pop() {
                Some(prev) => out.truncate(prev),
                None => {
                    // Nothing left to pop; keep the "..".
                    out.push_str("..");
                    if has_sep {
                        out.push('/');
                    }
                }
            },
            comp => {
                components.push(out.len());
                out.push_str(comp);
                if has_sep {
                    out.push('/');
                }
            }
        }
        ofs = end + 1;
    }
    out
}

// 256-entry lookup table bitmap encoded as 4 64-bit integers.
type Bitmap = [u64; 4];

/// Returns a (index, mask) tuple for testing/setting the n-th bit in a bitmap.
#[inline(always)]
const fn bitmap_index_and_mask(c: u8) -> (usize, u64) {
    let index = c as usize >> 6;
    let mask = 1u64 << (c & 63);
    (index, mask)
}

/// Baseline implementation of is_safe_char.
const fn is_safe_char_baseline(c: u8) -> bool {
    matches!(c as char, 'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '+' | '.' | '/')
}

/// Generates a character matching lookup table at compile time.
const fn safe_char_bitmap() -> Bitmap {
    let mut bitmap = [0u64; 4];
    let mut c = 0u8;
    loop {
        if is_safe_char_baseline(c) {
            let (index, mask) = bitmap_index_and_mask(c);
            bitmap[index] |= mask;
        }
        match c {
            u8::MAX => break,
            _ => c += 1,
        }
    }
    bitmap
}

/// Lookup table implementation of is_safe_char. Produces same output as
/// _baseline version.
fn is_safe_char(c: u8) -> bool {
    const BITMAP: Bitmap = safe_char_bitmap();
    let (index, mask) = bitmap_index_and_mask(c);
    (BITMAP[index] & mask) != 0
}

/// True when every character of `path` is in the allow-list of characters
/// that may be interpolated into a shell command line.  Node paths are
/// embedded verbatim in compile/link commands, so anything outside this
/// set (spaces, quotes, backticks, semicolons, non-ASCII) is rejected
/// before a command string is ever constructed.
pub fn is_safe_path(path: &str) -> bool {
    !path.is_empty() && path.bytes().all(is_safe_char)
}
