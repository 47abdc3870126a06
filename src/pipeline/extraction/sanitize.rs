/// Typographic punctuation that PDF text layers emit, with the ASCII
/// replacement used downstream.
///
/// U+FFFD is what a lossy decode leaves behind for an undecodable byte;
/// in lab reports it almost always stood for a dash inside a range.
const PUNCTUATION_MAP: &[(char, char)] = &[
    ('\u{FFFD}', '-'), // Replacement character
    ('\u{2013}', '-'), // En-dash –
    ('\u{2014}', '-'), // Em-dash —
    ('\u{2018}', '\''), // Left single quotation mark
    ('\u{2019}', '\''), // Right single quotation mark
    ('\u{201C}', '"'), // Left double quotation mark
    ('\u{201D}', '"'), // Right double quotation mark
];

/// Replace typographic punctuation in extracted text with ASCII.
///
/// Total and idempotent: every replacement target is non-ASCII and every
/// replacement is ASCII, so a second pass finds nothing to do.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            PUNCTUATION_MAP
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}
