use self::{
    error::{LexError, LexResult},
    input::{InputIter, InputIterToken},
};

use regex::Regex;

pub(crate) mod error;
mod input;

/// Longest-match lexer driven by an ordered list of regex rules.
pub struct Lexer<'input> {
    /// Input to be lexed.
    pub input: &'input str,
    /// Iterator over the input.
    iter: InputIter<'input>,
    /// Rules in the order they were added. On equal match lengths the earlier rule wins.
    rules: Vec<Rule>,
    /// Characters no rule could match.
    errors: Vec<LexError>,
    /// Whether the `Eof` token has been handed out.
    done: bool,
}

#[derive(Debug, Clone)]
struct Rule {
    /// Pattern anchored at the start of the remaining input.
    pattern: Regex,
    action: RuleAction,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum RuleAction {
    /// Emit a token of this kind.
    Token(TokenKind),
    /// Drop the matched input (whitespace, comments).
    Skip,
}

/// Category of a [`Token`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Operator,
    Punctuation,
    Identifier,
    /// Integer literal.
    Integer,
    /// Floating point literal.
    Float,
    /// A single character no rule matched.
    Invalid,
    /// Explicit end-of-input record. Always the last token of a stream.
    Eof,
}

/// Line and column of a character, both starting at 1.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// [`Token`] returned by the [`Lexer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind of token configured by the user.
    pub kind: TokenKind,
    /// Source string representation of the token. Empty for `Eof`.
    pub source: String,
    /// Position of the first character of the token.
    pub pos: Position,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of the first character of any input.
    pub fn start() -> Self {
        Self::new(1, 1)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Operator => "OPERATOR",
            TokenKind::Punctuation => "PUNCTUATION",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Integer => "INTEGER_LITERAL",
            TokenKind::Float => "FLOAT_LITERAL",
            TokenKind::Invalid => "ERROR",
            TokenKind::Eof => "EOF",
        })
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl Token {
    pub fn new(kind: TokenKind, source: impl Into<String>, pos: Position) -> Self {
        Self {
            kind,
            source: source.into(),
            pos,
        }
    }

    /// Creates the end-of-input record.
    pub fn eof(pos: Position) -> Self {
        Self::new(TokenKind::Eof, String::new(), pos)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Creates a new [`Token`] from the [`InputIterToken`].
    fn from_input_iter_token(InputIterToken { source, pos }: InputIterToken, kind: TokenKind) -> Self {
        Self { kind, source, pos }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            if self.iter.is_empty() {
                self.done = true;
                return Some(Token::eof(self.iter.pos()));
            }

            let Some((len, action)) = self.longest_match() else {
                // nothing matches, hand out the offending character and move on
                let (character, token) = self.iter.consume_char()?;
                tracing::trace!(%character, pos = %token.pos, "invalid character");
                self.errors.push(LexError::InvalidCharacter {
                    character,
                    pos: token.pos,
                });

                return Some(Token::from_input_iter_token(token, TokenKind::Invalid));
            };

            let token = self.iter.consume_token(len);
            match action {
                RuleAction::Skip => continue,
                RuleAction::Token(kind) => {
                    return Some(Token::from_input_iter_token(token, kind));
                }
            }
        }
    }
}

impl<'input> Lexer<'input> {
    /// Creates a `LexerGenerator`.
    pub fn builder() -> LexerGenerator {
        LexerGenerator::new()
    }

    /// Characters that could not be matched so far, in input order.
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    /// Length and action of the longest non-empty match at the cursor. Rules that were added
    /// first win ties.
    fn longest_match(&self) -> Option<(usize, RuleAction)> {
        let rest = self.iter.rest();

        self.rules.iter().fold(None, |best, rule| match rule.pattern.find(rest) {
            Some(m) if m.end() > best.map_or(0, |(len, _)| len) => Some((m.end(), rule.action)),
            _ => best,
        })
    }
}

/// Builder struct for the [`Lexer`].
#[derive(Debug, Clone, Default)]
pub struct LexerGenerator {
    rules: Vec<Rule>,
}

impl LexerGenerator {
    /// Creates a new empty [`LexerGenerator`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a token rule to the [`Lexer`].
    ///
    /// # Fails
    ///
    /// When the provided `pattern` is invalid regex.
    #[inline]
    pub fn with_token_unit(mut self, pattern: &str, kind: TokenKind) -> LexResult<Self> {
        self.add_rule(pattern, RuleAction::Token(kind))?;
        Ok(self)
    }

    /// Adds a rule whose matches are dropped from the token stream.
    ///
    /// # Fails
    ///
    /// When the provided `pattern` is invalid regex.
    #[inline]
    pub fn with_skip(mut self, pattern: &str) -> LexResult<Self> {
        self.add_rule(pattern, RuleAction::Skip)?;
        Ok(self)
    }

    fn add_rule(&mut self, pattern: &str, action: RuleAction) -> LexResult<()> {
        let anchored = Regex::new(&format!("^(?:{pattern})")).map_err(|source| LexError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;

        self.rules.push(Rule {
            pattern: anchored,
            action,
        });
        Ok(())
    }

    /// Builds the [`Lexer`].
    pub fn tokenize(self, input: &str) -> Lexer<'_> {
        Lexer {
            input,
            iter: InputIter::new(input),
            rules: self.rules,
            errors: Vec::new(),
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    macro_rules! tokens {
        ($(($line:expr, $column:expr, $source:expr) => $kind:expr),* $(,)?) => {
           vec![$(Token { kind: $kind, source: $source.into(), pos: Position::new($line, $column) }),*]
        };
    }

    use super::{LexError, Lexer, LexerGenerator, Position, Token, TokenKind};
    use proptest::prelude::*;

    fn small_language() -> Result<LexerGenerator, LexError> {
        Lexer::builder()
            .with_skip(r"[ \t\r\n]+")?
            .with_skip(r"//[^\n]*")?
            .with_skip(r"/\*(?s:.*?)\*/")?
            .with_token_unit("int", TokenKind::Keyword)?
            .with_token_unit(r"\+\+", TokenKind::Operator)?
            .with_token_unit(r"\+", TokenKind::Operator)?
            .with_token_unit("=", TokenKind::Operator)?
            .with_token_unit(";", TokenKind::Punctuation)?
            .with_token_unit(r"[0-9]+\.[0-9]+", TokenKind::Float)?
            .with_token_unit("[0-9]+", TokenKind::Integer)?
            .with_token_unit("[a-zA-Z_][a-zA-Z0-9_]*", TokenKind::Identifier)
    }

    #[test]
    fn lexer() -> Result<(), Box<dyn std::error::Error>> {
        let tokens: Vec<_> = small_language()?
            .tokenize("int integer = 3.25;\n  x++ // done\n/* a\nb */ 7")
            .collect();

        let expected = tokens![
            (1, 1, "int") => TokenKind::Keyword,
            (1, 5, "integer") => TokenKind::Identifier,
            (1, 13, "=") => TokenKind::Operator,
            (1, 15, "3.25") => TokenKind::Float,
            (1, 19, ";") => TokenKind::Punctuation,
            (2, 3, "x") => TokenKind::Identifier,
            (2, 4, "++") => TokenKind::Operator,
            (4, 6, "7") => TokenKind::Integer,
            (4, 7, "") => TokenKind::Eof,
        ];

        assert_eq!(tokens, expected);

        Ok(())
    }

    #[test]
    fn ties_go_to_the_first_rule() -> Result<(), Box<dyn std::error::Error>> {
        let tokens: Vec<_> = small_language()?.tokenize("int").collect();

        assert_eq!(tokens[0].kind, TokenKind::Keyword);

        Ok(())
    }

    #[test]
    fn invalid_character() -> Result<(), Box<dyn std::error::Error>> {
        let mut lexer = small_language()?.tokenize("x # ;");
        let tokens: Vec<_> = lexer.by_ref().collect();

        assert_eq!(
            tokens,
            tokens![
                (1, 1, "x") => TokenKind::Identifier,
                (1, 3, "#") => TokenKind::Invalid,
                (1, 5, ";") => TokenKind::Punctuation,
                (1, 6, "") => TokenKind::Eof,
            ]
        );
        assert!(matches!(
            lexer.errors(),
            [LexError::InvalidCharacter { character: '#', pos }] if *pos == Position::new(1, 3)
        ));

        Ok(())
    }

    #[test]
    fn empty_input_is_a_single_eof() -> Result<(), Box<dyn std::error::Error>> {
        let mut lexer = small_language()?.tokenize("");

        assert_eq!(lexer.next(), Some(Token::eof(Position::start())));
        assert_eq!(lexer.next(), None);

        Ok(())
    }

    #[test]
    fn invalid_pattern() {
        let result = Lexer::builder().with_token_unit("(", TokenKind::Punctuation);

        assert!(matches!(result, Err(LexError::Pattern { pattern, .. }) if pattern == "("));
    }

    proptest! {
        #[test]
        fn words_survive_whitespace(words in prop::collection::vec("[a-z][a-z0-9]{0,6}", 0..12), gap in "[ \t\n]{1,3}") {
            let input = words.join(&gap);
            let lexer = Lexer::builder()
                .with_skip(r"\s+")
                .and_then(|l| l.with_token_unit("[a-z][a-z0-9]*", TokenKind::Identifier))
                .expect("patterns are valid");

            let sources: Vec<_> = lexer
                .tokenize(&input)
                .filter(|t| !t.is_eof())
                .map(|t| t.source)
                .collect();

            prop_assert_eq!(sources, words);
        }
    }
}
