//! Recursive character splitting for UCP rulebook text.
//!
//! Splits on the coarsest separator that yields pieces within the chunk
//! size (paragraph, line, word, then raw characters), merges adjacent
//! pieces back up to the chunk size, and carries a tail of up to
//! `overlap` characters into the next chunk.

/// Chunk size used when indexing the UCP rulebook.
pub const UCP_CHUNK_SIZE: usize = 1000;
/// Overlap between consecutive UCP chunks.
pub const UCP_CHUNK_OVERLAP: usize = 200;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Split `text` into chunks of at most `chunk_size` characters.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);
    split_recursive(text, SEPARATORS, chunk_size, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(
    text: &str,
    separators: &[&str],
    chunk_size: usize,
    overlap: usize,
) -> Vec<String> {
    // Pick the first separator present in the text; "" always matches.
    let idx = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(sep))
        .unwrap_or(separators.len() - 1);
    let separator = separators[idx];
    let rest = &separators[idx + 1..];

    let pieces: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in pieces {
        if char_len(&piece) <= chunk_size {
            pending.push(piece);
            continue;
        }
        if !pending.is_empty() {
            chunks.extend(merge(&pending, separator, chunk_size, overlap));
            pending.clear();
        }
        if rest.is_empty() {
            chunks.push(piece);
        } else {
            chunks.extend(split_recursive(&piece, rest, chunk_size, overlap));
        }
    }
    if !pending.is_empty() {
        chunks.extend(merge(&pending, separator, chunk_size, overlap));
    }
    chunks
}

/// Greedily join pieces with `separator` up to `chunk_size`, keeping
/// trailing pieces totalling at most `overlap` characters as the start of
/// the next chunk.
fn merge(pieces: &[String], separator: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut out = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let joined_len = |total: usize, n: usize| if n > 0 { total + sep_len } else { total };

        if joined_len(total, window.len()) + len > chunk_size && !window.is_empty() {
            let chunk = window.join(separator).trim().to_string();
            if !chunk.is_empty() {
                out.push(chunk);
            }
            // Drop from the front until the remainder fits the overlap and leaves room.
            while !window.is_empty()
                && (total > overlap || joined_len(total, window.len()) + len > chunk_size)
            {
                let first = window.remove(0);
                total -= char_len(first);
                if !window.is_empty() {
                    total -= sep_len;
                }
            }
        }

        if !window.is_empty() {
            total += sep_len;
        }
        total += len;
        window.push(piece);
    }

    let chunk = window.join(separator).trim().to_string();
    if !chunk.is_empty() {
        out.push(chunk);
    }
    out
}
