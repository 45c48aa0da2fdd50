//! DDL statement resolution
//!
//! Turns the text of a binlog query event into single-target
//! [`NormalizedStatement`]s. The text is tokenized with the `sqlparser` MySQL
//! dialect (comments and whitespace are dropped) and the leading keywords are
//! matched against the DDL forms the relay replicates:
//!
//! ```text
//! CREATE  DATABASE|SCHEMA [IF NOT EXISTS] db
//! DROP    DATABASE|SCHEMA [IF EXISTS] db
//! ALTER   DATABASE|SCHEMA [db] ...
//! CREATE  [TEMPORARY] TABLE [IF NOT EXISTS] tbl ...
//! DROP    [TEMPORARY] TABLE [IF EXISTS] tbl [, tbl]...
//! ALTER   [ONLINE|OFFLINE] [IGNORE] TABLE tbl ...
//! RENAME  TABLE tbl TO tbl [, tbl TO tbl]...
//! TRUNCATE [TABLE] tbl
//! CREATE  [UNIQUE|FULLTEXT|SPATIAL] INDEX idx ... ON tbl ...
//! DROP    INDEX idx ON tbl
//! ```
//!
//! `DROP TABLE` and `RENAME TABLE` with several targets are split into one
//! statement per target, in source order, each with rewritten SQL. Every
//! other statement keeps its original text.
//!
//! The text must hold exactly one statement. A `;` followed by more tokens,
//! trailing tokens after a closed target list and over-qualified names are
//! parse errors, so no target can ride along unseen in a kept statement.

use crate::common::{DdlKind, FilterError, NormalizedStatement, Result, TableRef};
use sqlparser::dialect::MySqlDialect;
use sqlparser::tokenizer::{Token, Tokenizer};

/// Resolves DDL text into single-target statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlResolver;

impl DdlResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `sql` into normalized statements.
    ///
    /// Returns `Ok(None)` when the text is not a recognized DDL statement and
    /// an error when it starts like one but its targets cannot be determined.
    pub fn resolve(&self, sql: &str) -> Result<Option<Vec<NormalizedStatement>>> {
        let dialect = MySqlDialect {};
        let tokens = Tokenizer::new(&dialect, sql)
            .tokenize()
            .map_err(|e| FilterError::parse(e.to_string(), sql))?;

        let tokens: Vec<Token> = tokens
            .into_iter()
            .filter(|t| !matches!(t, Token::Whitespace(_) | Token::EOF))
            .collect();

        let mut parser = DdlParser {
            tokens,
            pos: 0,
            sql,
        };
        parser.parse()
    }
}

/// Resolve `sql` with a default [`DdlResolver`].
pub fn resolve_ddl(sql: &str) -> Result<Option<Vec<NormalizedStatement>>> {
    DdlResolver.resolve(sql)
}

struct DdlParser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    sql: &'a str,
}

impl DdlParser<'_> {
    fn parse(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        let statements = self.parse_statement()?;
        if statements.is_some() {
            self.check_single_statement()?;
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        if self.eat_keyword("CREATE") {
            self.parse_create()
        } else if self.eat_keyword("DROP") {
            self.parse_drop()
        } else if self.eat_keyword("ALTER") {
            self.parse_alter()
        } else if self.eat_keyword("RENAME") {
            self.parse_rename()
        } else if self.eat_keyword("TRUNCATE") {
            self.eat_keyword("TABLE");
            let table = self.expect_table()?;
            self.expect_end()?;
            Ok(Some(vec![self.single(DdlKind::TruncateTable, &table)]))
        } else {
            Ok(None)
        }
    }

    fn parse_create(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        if self.eat_schema_keyword() {
            self.eat_keywords(&["IF", "NOT", "EXISTS"]);
            let schema = self.expect_schema()?;
            return Ok(Some(vec![NormalizedStatement::schema(
                DdlKind::CreateSchema,
                schema,
                self.original(),
            )]));
        }

        self.eat_keywords(&["OR", "REPLACE"]);
        self.eat_keyword("TEMPORARY");
        if self.eat_keyword("TABLE") {
            self.eat_keywords(&["IF", "NOT", "EXISTS"]);
            let table = self.expect_table()?;
            return Ok(Some(vec![self.single(DdlKind::CreateTable, &table)]));
        }

        self.eat_any_keyword(&["ONLINE", "OFFLINE"]);
        self.eat_any_keyword(&["UNIQUE", "FULLTEXT", "SPATIAL"]);
        if self.eat_keyword("INDEX") {
            self.expect_ident("index name")?;
            self.skip_to_keyword("ON")?;
            let table = self.expect_table()?;
            return Ok(Some(vec![self.single(DdlKind::CreateIndex, &table)]));
        }

        Ok(None)
    }

    fn parse_drop(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        if self.eat_schema_keyword() {
            self.eat_keywords(&["IF", "EXISTS"]);
            let schema = self.expect_schema()?;
            self.expect_end()?;
            return Ok(Some(vec![NormalizedStatement::schema(
                DdlKind::DropSchema,
                schema,
                self.original(),
            )]));
        }

        let temporary = self.eat_keyword("TEMPORARY");
        if self.eat_keyword("TABLE") || self.eat_keyword("TABLES") {
            let if_exists = self.eat_keywords(&["IF", "EXISTS"]);
            let tables = self.expect_table_list()?;
            self.eat_any_keyword(&["RESTRICT", "CASCADE"]);
            self.expect_end()?;
            if tables.len() == 1 {
                return Ok(Some(vec![self.single(DdlKind::DropTable, &tables[0])]));
            }

            let prefix = format!(
                "DROP {}TABLE {}",
                if temporary { "TEMPORARY " } else { "" },
                if if_exists { "IF EXISTS " } else { "" }
            );
            let statements = tables
                .iter()
                .map(|t| {
                    NormalizedStatement::table(
                        DdlKind::DropTable,
                        t,
                        format!("{}{}", prefix, t.quoted()),
                    )
                })
                .collect();
            return Ok(Some(statements));
        }

        self.eat_any_keyword(&["ONLINE", "OFFLINE"]);
        if self.eat_keyword("INDEX") {
            self.expect_ident("index name")?;
            self.expect_keyword("ON")?;
            let table = self.expect_table()?;
            return Ok(Some(vec![self.single(DdlKind::DropIndex, &table)]));
        }

        Ok(None)
    }

    fn parse_alter(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        if self.eat_schema_keyword() {
            // The name is optional; without it the default database is altered.
            let schema = match self.peek() {
                Some(Token::Word(w))
                    if w.quote_style.is_some() || !is_alter_schema_option(&w.value) =>
                {
                    let name = w.value.clone();
                    self.pos += 1;
                    self.reject_qualifier("database name")?;
                    name
                }
                Some(_) => String::new(),
                None => {
                    return Err(FilterError::parse(
                        "ALTER DATABASE without a database name or option",
                        self.sql,
                    ))
                }
            };
            return Ok(Some(vec![NormalizedStatement::schema(
                DdlKind::AlterSchema,
                schema,
                self.original(),
            )]));
        }

        self.eat_any_keyword(&["ONLINE", "OFFLINE"]);
        self.eat_keyword("IGNORE");
        if self.eat_keyword("TABLE") {
            let table = self.expect_table()?;
            let mut statement = self.single(DdlKind::AlterTable, &table);
            if let Some(to) = self.find_alter_rename()? {
                statement = statement.with_rename_to(to);
            }
            return Ok(Some(vec![statement]));
        }

        Ok(None)
    }

    fn parse_rename(&mut self) -> Result<Option<Vec<NormalizedStatement>>> {
        if !(self.eat_keyword("TABLE") || self.eat_keyword("TABLES")) {
            // RENAME USER and friends
            return Ok(None);
        }

        let mut pairs = Vec::new();
        loop {
            let from = self.expect_table()?;
            self.expect_keyword("TO")?;
            let to = self.expect_table()?;
            pairs.push((from, to));
            if !self.eat_token(&Token::Comma) {
                break;
            }
        }
        self.expect_end()?;

        let single = pairs.len() == 1;
        let statements = pairs
            .into_iter()
            .map(|(from, to)| {
                let sql = if single {
                    self.original()
                } else {
                    format!("RENAME TABLE {} TO {}", from.quoted(), to.quoted())
                };
                NormalizedStatement::table(DdlKind::RenameTable, &from, sql).with_rename_to(to)
            })
            .collect();
        Ok(Some(statements))
    }

    fn single(&self, kind: DdlKind, table: &TableRef) -> NormalizedStatement {
        NormalizedStatement::table(kind, table, self.original())
    }

    fn original(&self) -> String {
        self.sql.trim().trim_end_matches(';').trim_end().to_string()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.peek(),
            Some(Token::Word(w)) if w.quote_style.is_none() && w.value.eq_ignore_ascii_case(keyword)
        )
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_any_keyword(&mut self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.eat_keyword(k))
    }

    /// Consume the whole keyword sequence or nothing.
    fn eat_keywords(&mut self, keywords: &[&str]) -> bool {
        let start = self.pos;
        for keyword in keywords {
            if !self.eat_keyword(keyword) {
                self.pos = start;
                return false;
            }
        }
        true
    }

    fn eat_schema_keyword(&mut self) -> bool {
        self.eat_keyword("DATABASE") || self.eat_keyword("SCHEMA")
    }

    fn eat_token(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    /// Advance past the next `keyword`, skipping whatever precedes it.
    fn skip_to_keyword(&mut self, keyword: &str) -> Result<()> {
        while self.peek().is_some() {
            if self.eat_keyword(keyword) {
                return Ok(());
            }
            self.pos += 1;
        }
        Err(self.unexpected(keyword))
    }

    fn expect_ident(&mut self, what: &str) -> Result<String> {
        match self.peek() {
            Some(Token::Word(w)) => {
                let ident = w.value.clone();
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.unexpected(what)),
        }
    }

    fn expect_table(&mut self) -> Result<TableRef> {
        let first = self.expect_ident("table name")?;
        if self.eat_token(&Token::Period) {
            let table = self.expect_ident("table name")?;
            self.reject_qualifier("table name")?;
            Ok(TableRef::new(Some(first), table))
        } else {
            Ok(TableRef::new(None, first))
        }
    }

    /// A database name, which cannot be qualified.
    fn expect_schema(&mut self) -> Result<String> {
        let schema = self.expect_ident("database name")?;
        self.reject_qualifier("database name")?;
        Ok(schema)
    }

    fn reject_qualifier(&self, what: &str) -> Result<()> {
        if self.peek() == Some(&Token::Period) {
            return Err(FilterError::parse(
                format!("unexpected '.' after {}", what),
                self.sql,
            ));
        }
        Ok(())
    }

    /// Require the end of the statement, allowing one trailing `;`.
    fn expect_end(&mut self) -> Result<()> {
        self.eat_token(&Token::SemiColon);
        match self.peek() {
            None => Ok(()),
            Some(_) => Err(self.unexpected("end of statement")),
        }
    }

    /// Reject a `;` that is followed by another statement.
    fn check_single_statement(&self) -> Result<()> {
        let last = self.tokens.len().saturating_sub(1);
        let stacked = self
            .tokens
            .iter()
            .enumerate()
            .any(|(i, t)| *t == Token::SemiColon && i < last);
        if stacked {
            return Err(FilterError::parse(
                "multiple statements in one query event",
                self.sql,
            ));
        }
        Ok(())
    }

    /// Destination of a top-level `RENAME [TO|AS] tbl` clause of ALTER TABLE.
    ///
    /// `RENAME COLUMN`, `RENAME INDEX` and `RENAME KEY` keep the table.
    fn find_alter_rename(&mut self) -> Result<Option<TableRef>> {
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None | Some(Token::SemiColon) => return Ok(None),
                Some(Token::LParen) => depth += 1,
                Some(Token::RParen) => depth = depth.saturating_sub(1),
                Some(_) if depth == 0 && self.peek_keyword("RENAME") => {
                    self.pos += 1;
                    if !(self.peek_keyword("COLUMN")
                        || self.peek_keyword("INDEX")
                        || self.peek_keyword("KEY"))
                    {
                        self.eat_any_keyword(&["TO", "AS"]);
                        return self.expect_table().map(Some);
                    }
                }
                Some(_) => {}
            }
            self.pos += 1;
        }
    }

    fn expect_table_list(&mut self) -> Result<Vec<TableRef>> {
        let mut tables = vec![self.expect_table()?];
        while self.eat_token(&Token::Comma) {
            tables.push(self.expect_table()?);
        }
        Ok(tables)
    }

    fn unexpected(&self, expected: &str) -> FilterError {
        let found = match self.peek() {
            Some(token) => format!("'{}'", token),
            None => "end of statement".to_string(),
        };
        FilterError::parse(format!("expected {}, found {}", expected, found), self.sql)
    }
}

/// Options that may directly follow `ALTER DATABASE` when the name is omitted.
fn is_alter_schema_option(word: &str) -> bool {
    const OPTIONS: &[&str] = &[
        "DEFAULT",
        "CHARACTER",
        "CHARSET",
        "COLLATE",
        "ENCRYPTION",
        "READ",
        "UPGRADE",
    ];
    OPTIONS.iter().any(|o| o.eq_ignore_ascii_case(word))
}
