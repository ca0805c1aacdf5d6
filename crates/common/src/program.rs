//! Program representation for stackvm bytecode.
//!
//! A program is a flat sequence of signed integers interleaving opcodes and
//! their operand literals. Addresses are plain indices into that sequence.

use crate::error::LoadError;

/// An immutable bytecode program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    code: Vec<i64>,
}

impl Program {
    /// Create a program from its integer code.
    pub fn new(code: Vec<i64>) -> Self {
        Self { code }
    }

    /// Load a program from a textual integer listing.
    ///
    /// Integers are separated by whitespace and/or commas. `#` and `;`
    /// start a comment that runs to the end of the line. This only reads
    /// the integer array; mnemonics are not accepted.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut code = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let content = match line.find(['#', ';']) {
                Some(pos) => &line[..pos],
                None => line,
            };

            for token in content
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
            {
                let value = token.parse::<i64>().map_err(|_| LoadError::InvalidInteger {
                    line: idx + 1,
                    token: token.to_string(),
                })?;
                code.push(value);
            }
        }

        Ok(Self { code })
    }

    /// The integer code.
    pub fn code(&self) -> &[i64] {
        &self.code
    }

    /// Value at `addr`, or `None` past the end.
    pub fn get(&self, addr: usize) -> Option<i64> {
        self.code.get(addr).copied()
    }

    /// Number of integers in the program.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the program has no code.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

impl From<Vec<i64>> for Program {
    fn from(code: Vec<i64>) -> Self {
        Self::new(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.get(0), None);
    }

    #[test]
    fn parse_whitespace_and_commas() {
        let program = Program::parse("9, 99,\n14 18").unwrap();
        assert_eq!(program.code(), &[9, 99, 14, 18]);
    }

    #[test]
    fn parse_negative_values() {
        let program = Program::parse("9 -5 10 -3").unwrap();
        assert_eq!(program.code(), &[9, -5, 10, -3]);
    }

    #[test]
    fn parse_strips_comments() {
        let text = "\
# push and print
9, 7,   ; iconst 7
14      # print

18
";
        let program = Program::parse(text).unwrap();
        assert_eq!(program.code(), &[9, 7, 14, 18]);
    }

    #[test]
    fn parse_empty_text() {
        assert!(Program::parse("").unwrap().is_empty());
        assert!(Program::parse("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn parse_rejects_mnemonics() {
        assert_eq!(
            Program::parse("9 1\niadd"),
            Err(LoadError::InvalidInteger {
                line: 2,
                token: "iadd".to_string()
            })
        );
    }

    #[test]
    fn parse_rejects_overflowing_literal() {
        let result = Program::parse("99999999999999999999");
        assert!(matches!(result, Err(LoadError::InvalidInteger { line: 1, .. })));
    }
}
