//! Reply formatting helpers
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add `code_block` for tabular replies
//! - 1.0.0: Line-aware chunking for replies over the message limit

/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Split text into pieces of at most `max_size` bytes.
///
/// Splits on line boundaries when possible and never inside a UTF-8
/// character. Text already within the limit comes back as a single piece.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        // +1 for the newline joining it to the next line
        if current.len() + line.len() + 1 > max_size {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            if line.len() + 1 > max_size {
                chunks.extend(split_long_line(line, max_size));
                continue;
            }
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn split_long_line(line: &str, max_size: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Chunk text for message content (2000 byte limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}

/// Wrap text in a fenced code block.
pub fn code_block(text: &str) -> String {
    format!("```\n{}\n```", text.trim_end())
}
