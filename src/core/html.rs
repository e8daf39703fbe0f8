// src/core/html.rs
//
// Tolerant, allocation-light scanning of HTML blocks. Tag and attribute
// names match case-insensitively; nesting of the same tag is not tracked.

/// ASCII-only lowercase; byte offsets stay valid against the source.
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}

/// A document plus its lowercased twin, so repeated scans lowercase once.
pub struct Markup<'a> {
    src: &'a str,
    lc: String,
}

impl<'a> Markup<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, lc: to_lower(src) }
    }

    /// Next `<tag …>…</tag>` block at or after `from`, as `(start, end)` byte
    /// offsets covering the whole block. `<th` never matches `<thead>`.
    pub fn next_block(&self, tag: &str, from: usize) -> Option<(usize, usize)> {
        let open = join!("<", &to_lower(tag));
        let close = join!("</", &to_lower(tag));

        let mut at = from;
        let start = loop {
            let cand = self.lc.get(at..)?.find(&open)? + at;
            let after = cand + open.len();
            match self.lc.as_bytes().get(after) {
                Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => break cand,
                Some(_) => at = after,
                None => return None,
            }
        };
        let open_end = self.src[start..].find('>')? + start + 1;
        let close_rel = self.lc[open_end..].find(&close)?;
        let close_start = open_end + close_rel;
        let end = self.lc[close_start..].find('>').map_or(self.src.len(), |i| close_start + i + 1);
        Some((start, end))
    }

    /// All `tag` blocks in order, as source slices.
    pub fn blocks(&self, tag: &str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut pos = 0usize;
        while let Some((s, e)) = self.next_block(tag, pos) {
            out.push(&self.src[s..e]);
            pos = e;
        }
        out
    }

    /// Every opening tag `<tag …>` (no closing tag required), e.g. `<input>`.
    pub fn open_tags(&self, tag: &str) -> Vec<&'a str> {
        let open = join!("<", &to_lower(tag));
        let mut out = Vec::new();
        let mut at = 0usize;
        while let Some(rel) = self.lc.get(at..).and_then(|s| s.find(&open)) {
            let start = at + rel;
            let after = start + open.len();
            let boundary = self
                .lc
                .as_bytes()
                .get(after)
                .is_some_and(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/');
            match self.src[start..].find('>') {
                Some(gt) if boundary => {
                    out.push(&self.src[start..start + gt + 1]);
                    at = start + gt + 1;
                }
                Some(_) => at = after,
                None => break,
            }
        }
        out
    }

    pub fn contains_ci(&self, needle: &str) -> bool {
        self.lc.contains(&to_lower(needle))
    }
}

/// The opening tag of a block, `<td class="x">` out of `<td class="x">1</td>`.
pub fn opener(block: &str) -> &str {
    match block.find('>') {
        Some(i) => &block[..=i],
        None => block,
    }
}

/// Given a complete tag block like `<td ...>INNER</td>`, return INNER
/// (still may contain nested tags).
pub fn inner_after_open_tag(block: &str) -> &str {
    if let (Some(oe), Some(cs)) = (block.find('>'), block.rfind('<')) {
        if cs > oe {
            return &block[oe + 1..cs];
        }
    }
    ""
}

/// Attribute value from an opening tag. Handles `"…"`, `'…'` and bare values.
pub fn attr<'a>(open_tag: &'a str, name: &str) -> Option<&'a str> {
    let lc = to_lower(open_tag);
    let needle = to_lower(name);
    let bytes = lc.as_bytes();
    let mut from = 0usize;

    while let Some(rel) = lc[from..].find(&needle) {
        let at = from + rel;
        from = at + needle.len();

        // Must be a whole attribute name: preceded by whitespace, followed by `=`
        let before_ok = at > 0 && bytes[at - 1].is_ascii_whitespace();
        let mut i = at + needle.len();
        while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }
        if !before_ok || bytes.get(i) != Some(&b'=') { continue; }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() { i += 1; }

        let val = &open_tag[i..];
        return Some(match val.as_bytes().first() {
            Some(q @ (b'"' | b'\'')) => {
                let q = *q as char;
                let end = val[1..].find(q).map_or(val.len(), |e| e + 1);
                &val[1..end]
            }
            _ => {
                let end = val
                    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                    .unwrap_or(val.len());
                &val[..end]
            }
        });
    }
    None
}

/// Remove all HTML tags `<...>`, decode common entities, collapse whitespace.
pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&super::sanitize::normalize_entities(&out))
}

/// Visible text of a cell block.
pub fn cell_text(block: &str) -> String {
    strip_tags(inner_after_open_tag(block))
}
