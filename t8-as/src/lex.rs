//! Source line scanner.
//!
//! One source line holds one instruction: a mnemonic keyword of uppercase
//! letters, then up to two comma-separated operand tokens of uppercase
//! letters and digits, optionally terminated by `;`. Only the first 16
//! characters of a line are ever scanned.

use alloc::string::String;

/// Characters scanned per line; everything past the window is ignored.
const SCAN_WINDOW: usize = 16;

/// One scanned source line: a mnemonic keyword and two operand tokens,
/// either of which may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub mnemonic: String,
    pub args: [String; 2],
}

impl Line {
    /// Scans one line of source text.
    ///
    /// The keyword is the leading run of `A`-`Z`. After it, `A`-`Z` and
    /// `0`-`9` collect into the current operand token, `,` switches
    /// collection to the second operand (restarting it), `;` stops the scan
    /// and any other character is skipped. Scanning never fails: unknown
    /// keywords are rejected by the writer, and malformed operand tokens
    /// resolve to immediates there.
    ///
    /// # Example
    /// ```
    /// # use t8_as::lex::Line;
    /// let line = Line::scan("LOAD AL,5; comment");
    ///
    /// assert_eq!(line.mnemonic, "LOAD");
    /// assert_eq!(line.args, ["AL".to_string(), "5".to_string()]);
    /// ```
    pub fn scan(text: &str) -> Self {
        let mut line = Line::default();
        let mut in_keyword = true;
        let mut arg = 0;

        for c in text.chars().take(SCAN_WINDOW) {
            if in_keyword {
                if c.is_ascii_uppercase() {
                    line.mnemonic.push(c);
                    continue;
                }
                in_keyword = false;
            }
            match c {
                ';' => break,
                ',' => {
                    arg = 1;
                    line.args[1].clear();
                }
                'A'..='Z' | '0'..='9' => line.args[arg].push(c),
                _ => {}
            }
        }

        line
    }
}

/// Iterator over the scanned [`Line`]s of a source buffer.
///
/// # Example
/// ```
/// # use t8_as::lex::{Lex, Line};
/// #
/// let source = "LOAD AL,5;\nSTOR 0,AL;\nNOP";
/// let lines: Vec<Line> = Lex::new(source).collect();
///
/// assert_eq!(lines.len(), 3);
/// assert_eq!(lines[1].mnemonic, "STOR");
/// assert_eq!(lines[2].args, [String::new(), String::new()]);
/// ```
pub struct Lex<'a> {
    lines: core::str::Lines<'a>,
}

impl<'a> Lex<'a> {
    /// Creates a new scanner over a source buffer.
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.lines(),
        }
    }
}

impl Iterator for Lex<'_> {
    type Item = Line;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(Line::scan)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};
    use super::*;

    fn line(mnemonic: &str, arg1: &str, arg2: &str) -> Line {
        Line {
            mnemonic: mnemonic.to_string(),
            args: [arg1.to_string(), arg2.to_string()],
        }
    }

    #[test]
    fn normal_fragment() {
        let source = "\
LOAD AL,5;
MOV AL,BL
INC AL,AL;
NOP";
        let expected = [
            line("LOAD", "AL", "5"),
            line("MOV", "AL", "BL"),
            line("INC", "AL", "AL"),
            line("NOP", "", ""),
        ];

        let actual: Vec<_> = Lex::new(source).collect();

        assert_eq!(actual, expected);
    }

    #[test]
    fn quirky_fragments() {
        #[rustfmt::skip]
        let cases = [
            // semicolon stops the scan
            ("NOP;JMP 0",           line("NOP", "", "")),
            // only the first 16 characters are scanned
            ("LOAD AL,123456789",   line("LOAD", "AL", "12345678")),
            // a second comma restarts operand 2
            ("MOV AL,BL,CL",        line("MOV", "AL", "CL")),
            // unrecognized characters are skipped, not collected
            ("LOAD A L, 5",         line("LOAD", "AL", "5")),
            // lowercase is not a keyword and not an operand character
            ("mov al,bl",           line("", "", "")),
            // keyword ends at the first non-letter
            ("JMP10",               line("JMP", "10", "")),
            ("",                    line("", "", "")),
        ];

        for (text, expected) in cases {
            assert_eq!(Line::scan(text), expected, "line: `{text}`");
        }
    }
}
