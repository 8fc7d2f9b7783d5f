//! Grammar, scanner and semantic profile of the compiled language:
//!
//! ```text
//! int main() {
//!     int i = 0, n = 10;
//!     float sum;
//!     while (i < n) {
//!         sum = sum + i * 2.5;
//!         i++;
//!     }
//! }
//! ```

use predict_lexer::{LexResult, Lexer, LexerGenerator, TokenKind};
use predict_parser::{Config, Grammar, GrammarResult};

const KEYWORDS: [&str; 4] = ["int", "float", "while", "main"];
const OPERATORS: [&str; 9] = ["++", "--", "+", "-", "*", "/", "=", "<", ">"];
const PUNCTUATION: [&str; 6] = [";", ",", "(", ")", "{", "}"];

pub fn grammar() -> GrammarResult<Grammar> {
    Grammar::builder()
        .with_terminals(PUNCTUATION)?
        .with_terminals(["int", "float", "main", "=", "while", "<", ">"])?
        .with_terminals(["++", "--", "+", "-", "*", "/", "ID", "CONST"])?
        .with_variables([
            "program",
            "stmts",
            "stmt",
            "decl",
            "type",
            "id_list",
            "id_tail",
            "init_opt",
            "while_stmt",
            "expr_stmt",
            "expr_stmt_tail",
            "expr",
            "expr_tail",
            "term",
            "term_tail",
            "factor",
            "unary_op",
            "cond",
            "rel_op",
            "add_op",
            "mul_op",
        ])?
        .with_start_variable("program")?
        .with_production("program", ["int", "main", "(", ")", "{", "stmts", "}"])?
        .with_productions("stmts", [vec!["stmt", "stmts"], vec!["ε"]])?
        .with_productions("stmt", [["decl"], ["expr_stmt"], ["while_stmt"]])?
        .with_production("decl", ["type", "id_list", ";"])?
        .with_productions("type", [["int"], ["float"]])?
        .with_production("id_list", ["ID", "init_opt", "id_tail"])?
        .with_productions(
            "id_tail",
            [vec![",", "ID", "init_opt", "id_tail"], vec!["ε"]],
        )?
        .with_productions("init_opt", [vec!["=", "expr"], vec!["ε"]])?
        .with_productions(
            "expr_stmt",
            [vec!["ID", "expr_stmt_tail"], vec!["unary_op", "ID", ";"]],
        )?
        .with_productions(
            "expr_stmt_tail",
            [vec!["=", "expr", ";"], vec!["++", ";"], vec!["--", ";"]],
        )?
        .with_production(
            "while_stmt",
            ["while", "(", "cond", ")", "{", "stmts", "}"],
        )?
        .with_production("cond", ["expr", "rel_op", "expr"])?
        .with_productions("rel_op", [["<"], [">"]])?
        .with_production("expr", ["term", "expr_tail"])?
        .with_productions("expr_tail", [vec!["add_op", "term", "expr_tail"], vec!["ε"]])?
        .with_production("term", ["factor", "term_tail"])?
        .with_productions("term_tail", [vec!["mul_op", "factor", "term_tail"], vec!["ε"]])?
        .with_productions("factor", [vec!["ID"], vec!["CONST"], vec!["(", "expr", ")"]])?
        .with_productions("unary_op", [["++"], ["--"]])?
        .with_productions("add_op", [["+"], ["-"]])?
        .with_productions("mul_op", [["*"], ["/"]])?
        .with_restart_points(["stmts", "stmt", "decl", "expr_stmt"])?
        .build()
}

pub fn lexer() -> LexResult<LexerGenerator> {
    let mut lexer = Lexer::builder()
        .with_skip(r"\s+")?
        .with_skip(r"//[^\n]*")?
        .with_skip(r"/\*(?s:.*?)\*/")?;

    for keyword in KEYWORDS {
        lexer = lexer.with_token_unit(keyword, TokenKind::Keyword)?;
    }
    for operator in OPERATORS {
        lexer = lexer.with_token_unit(&regex::escape(operator), TokenKind::Operator)?;
    }
    for punctuation in PUNCTUATION {
        lexer = lexer.with_token_unit(&regex::escape(punctuation), TokenKind::Punctuation)?;
    }

    lexer
        .with_token_unit(r"[0-9]+\.[0-9]+", TokenKind::Float)?
        .with_token_unit("[0-9]+", TokenKind::Integer)?
        .with_token_unit("[a-zA-Z_][a-zA-Z0-9_]*", TokenKind::Identifier)
}

/// The header `int main ( ) {` opens with a type keyword, so `{` also ends declaration
/// mode.
pub fn config() -> Config {
    let mut config = Config::default();
    config.declaration_ends.push("{".into());
    config
}
