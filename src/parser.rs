// ABOUTME: Recursive-descent parser building the raw AST from the token stream

use crate::error::RpalError;
use crate::lexer::{Token, TokenKind};
use crate::tree::Tree;

/// Parses a full RPAL program and checks that every token was consumed.
pub fn parse(tokens: &[Token]) -> Result<Tree, RpalError> {
    let mut cursor = Cursor::new(tokens);
    let tree = cursor.parse_e()?;
    if !cursor.at_end() {
        return Err(RpalError::SyntaxError(format!(
            "end of file expected, found '{}'",
            cursor.peek_text()
        )));
    }
    Ok(tree)
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_text(&self) -> &str {
        self.peek().map(|t| t.text.as_str()).unwrap_or("<eof>")
    }

    fn peek_is(&self, text: &str) -> bool {
        self.peek().map(|t| t.text == text).unwrap_or(false)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Token {
        let t = self.tokens[self.pos].clone();
        self.pos += 1;
        t
    }

    fn expect(&mut self, text: &str) -> Result<(), RpalError> {
        if self.peek_is(text) {
            self.advance();
            Ok(())
        } else {
            Err(RpalError::SyntaxError(format!(
                "'{}' expected, found '{}'",
                text,
                self.peek_text()
            )))
        }
    }

    fn syntax_error(&self, message: impl Into<String>) -> RpalError {
        RpalError::SyntaxError(format!("{}, found '{}'", message.into(), self.peek_text()))
    }

    // E -> 'let' D 'in' E | 'fn' Vb+ '.' E | Ew
    fn parse_e(&mut self) -> Result<Tree, RpalError> {
        if self.peek_is("let") {
            self.advance();
            let d = self.parse_d()?;
            self.expect("in")?;
            let e = self.parse_e()?;
            Ok(Tree::node("let", vec![d, e]))
        } else if self.peek_is("fn") {
            self.advance();
            let mut vars = Vec::new();
            while self.peek_kind() == Some(TokenKind::Identifier) || self.peek_is("(") {
                vars.push(self.parse_vb()?);
            }
            if vars.is_empty() {
                return Err(self.syntax_error("at least one identifier expected"));
            }
            self.expect(".")?;
            let body = self.parse_e()?;
            vars.push(body);
            Ok(Tree::node("lambda", vars))
        } else {
            self.parse_ew()
        }
    }

    // Ew -> T 'where' Dr | T
    fn parse_ew(&mut self) -> Result<Tree, RpalError> {
        let t = self.parse_t()?;
        if self.peek_is("where") {
            self.advance();
            let dr = self.parse_dr()?;
            Ok(Tree::node("where", vec![t, dr]))
        } else {
            Ok(t)
        }
    }

    // T -> Ta (',' Ta)*
    fn parse_t(&mut self) -> Result<Tree, RpalError> {
        let mut parts = vec![self.parse_ta()?];
        while self.peek_is(",") {
            self.advance();
            parts.push(self.parse_ta()?);
        }
        if parts.len() > 1 {
            Ok(Tree::node("tau", parts))
        } else {
            Ok(parts.pop().unwrap())
        }
    }

    // Ta -> Tc ('aug' Tc)*
    fn parse_ta(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_tc()?;
        while self.peek_is("aug") {
            self.advance();
            let right = self.parse_tc()?;
            left = Tree::node("aug", vec![left, right]);
        }
        Ok(left)
    }

    // Tc -> B '->' Tc '|' Tc | B
    fn parse_tc(&mut self) -> Result<Tree, RpalError> {
        let b = self.parse_b()?;
        if self.peek_is("->") {
            self.advance();
            let then_branch = self.parse_tc()?;
            self.expect("|")?;
            let else_branch = self.parse_tc()?;
            Ok(Tree::node("->", vec![b, then_branch, else_branch]))
        } else {
            Ok(b)
        }
    }

    // B -> Bt ('or' Bt)*
    fn parse_b(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_bt()?;
        while self.peek_is("or") {
            self.advance();
            let right = self.parse_bt()?;
            left = Tree::node("or", vec![left, right]);
        }
        Ok(left)
    }

    // Bt -> Bs ('&' Bs)*
    fn parse_bt(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_bs()?;
        while self.peek_is("&") {
            self.advance();
            let right = self.parse_bs()?;
            left = Tree::node("&", vec![left, right]);
        }
        Ok(left)
    }

    // Bs -> 'not' Bp | Bp
    fn parse_bs(&mut self) -> Result<Tree, RpalError> {
        if self.peek_is("not") {
            self.advance();
            let bp = self.parse_bp()?;
            Ok(Tree::node("not", vec![bp]))
        } else {
            self.parse_bp()
        }
    }

    // Bp -> A (('gr'|'ge'|'ls'|'le'|'eq'|'ne') A)?
    fn parse_bp(&mut self) -> Result<Tree, RpalError> {
        let a = self.parse_a()?;
        for op in ["gr", "ge", "ls", "le", "eq", "ne"] {
            if self.peek_is(op) {
                self.advance();
                let rhs = self.parse_a()?;
                return Ok(Tree::node(op, vec![a, rhs]));
            }
        }
        Ok(a)
    }

    // A -> ('+'|'-')? At (('+'|'-') At)*
    fn parse_a(&mut self) -> Result<Tree, RpalError> {
        let mut left = if self.peek_is("+") {
            self.advance();
            self.parse_at()?
        } else if self.peek_is("-") {
            self.advance();
            let at = self.parse_at()?;
            Tree::node("neg", vec![at])
        } else {
            self.parse_at()?
        };

        loop {
            if self.peek_is("+") {
                self.advance();
                let rhs = self.parse_at()?;
                left = Tree::node("+", vec![left, rhs]);
            } else if self.peek_is("-") {
                self.advance();
                let rhs = self.parse_at()?;
                left = Tree::node("-", vec![left, rhs]);
            } else {
                break;
            }
        }
        Ok(left)
    }

    // At -> Af (('*'|'/') Af)*
    fn parse_at(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_af()?;
        loop {
            if self.peek_is("*") {
                self.advance();
                let rhs = self.parse_af()?;
                left = Tree::node("*", vec![left, rhs]);
            } else if self.peek_is("/") {
                self.advance();
                let rhs = self.parse_af()?;
                left = Tree::node("/", vec![left, rhs]);
            } else {
                break;
            }
        }
        Ok(left)
    }

    // Af -> Ap ('**' Ap)*
    fn parse_af(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_ap()?;
        while self.peek_is("**") {
            self.advance();
            let rhs = self.parse_ap()?;
            left = Tree::node("**", vec![left, rhs]);
        }
        Ok(left)
    }

    // Ap -> R ('@' identifier R)*
    fn parse_ap(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_r()?;
        while self.peek_is("@") {
            self.advance();
            if self.peek_kind() != Some(TokenKind::Identifier) {
                return Err(self.syntax_error("identifier expected"));
            }
            let name = self.advance();
            let rhs = self.parse_r()?;
            left = Tree::node("@", vec![left, Tree::leaf("identifier", name.text), rhs]);
        }
        Ok(left)
    }

    // R -> Rn+ (left-folded as gamma applications)
    fn parse_r(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_rn()?;
        while self.starts_rn() {
            let rhs = self.parse_rn()?;
            left = Tree::node("gamma", vec![left, rhs]);
        }
        Ok(left)
    }

    fn starts_rn(&self) -> bool {
        match self.peek_kind() {
            Some(TokenKind::Identifier) | Some(TokenKind::Integer) | Some(TokenKind::Str) => true,
            _ => self.peek_is("(") || self.peek_is("dummy"),
        }
    }

    // Rn -> identifier | integer | string | 'nil' | 'dummy' | '(' E ')'
    fn parse_rn(&mut self) -> Result<Tree, RpalError> {
        if self.peek_is("nil") {
            self.advance();
            return Ok(Tree::leaf("nil", "nil"));
        }
        if self.peek_is("dummy") {
            self.advance();
            return Ok(Tree::leaf("dummy", "dummy"));
        }
        match self.peek_kind() {
            Some(TokenKind::Identifier) => {
                let t = self.advance();
                Ok(Tree::leaf("identifier", t.text))
            }
            Some(TokenKind::Integer) => {
                let t = self.advance();
                Ok(Tree::leaf("integer", t.text))
            }
            Some(TokenKind::Str) => {
                let t = self.advance();
                Ok(Tree::leaf("string", t.text))
            }
            _ => {
                if self.peek_is("(") {
                    self.advance();
                    let e = self.parse_e()?;
                    self.expect(")")?;
                    Ok(e)
                } else {
                    Err(self.syntax_error(
                        "identifier, integer, string, '(', or 'dummy' expected",
                    ))
                }
            }
        }
    }

    // D -> Da ('within' D)*
    fn parse_d(&mut self) -> Result<Tree, RpalError> {
        let mut left = self.parse_da()?;
        while self.peek_is("within") {
            self.advance();
            let right = self.parse_d()?;
            left = Tree::node("within", vec![left, right]);
        }
        Ok(left)
    }

    // Da -> Dr ('and' Dr)*
    fn parse_da(&mut self) -> Result<Tree, RpalError> {
        let mut parts = vec![self.parse_dr()?];
        while self.peek_is("and") {
            self.advance();
            parts.push(self.parse_dr()?);
        }
        if parts.len() > 1 {
            Ok(Tree::node("and", parts))
        } else {
            Ok(parts.pop().unwrap())
        }
    }

    // Dr -> 'rec' Db | Db
    fn parse_dr(&mut self) -> Result<Tree, RpalError> {
        if self.peek_is("rec") {
            self.advance();
            let db = self.parse_db()?;
            Ok(Tree::node("rec", vec![db]))
        } else {
            self.parse_db()
        }
    }

    // Db -> '(' D ')' | identifier (',' Vl '=' E | Vb* '=' E)
    fn parse_db(&mut self) -> Result<Tree, RpalError> {
        if self.peek_is("(") {
            self.advance();
            let d = self.parse_d()?;
            self.expect(")")?;
            return Ok(d);
        }

        if self.peek_kind() != Some(TokenKind::Identifier) {
            return Err(self.syntax_error("'(' or identifier expected"));
        }

        let name_tok = self.advance();
        let name = Tree::leaf("identifier", name_tok.text);

        if self.peek_is(",") {
            self.advance();
            let vl = self.parse_vl_from(name)?;
            self.expect("=")?;
            let e = self.parse_e()?;
            return Ok(Tree::node("=", vec![vl, e]));
        }

        let mut params = Vec::new();
        while !self.peek_is("=") && (self.peek_kind() == Some(TokenKind::Identifier)) {
            params.push(self.parse_vb()?);
        }
        if self.peek_is("(") {
            params.push(self.parse_vb()?);
        }

        if params.is_empty() {
            self.expect("=")?;
            let e = self.parse_e()?;
            Ok(Tree::node("=", vec![name, e]))
        } else {
            self.expect("=")?;
            let e = self.parse_e()?;
            let mut children = vec![name];
            children.extend(params);
            children.push(e);
            Ok(Tree::node("fcn_form", children))
        }
    }

    // Vb -> identifier | '(' ')' | '(' identifier (',' Vl)? ')'
    fn parse_vb(&mut self) -> Result<Tree, RpalError> {
        if self.peek_kind() == Some(TokenKind::Identifier) {
            let t = self.advance();
            return Ok(Tree::leaf("identifier", t.text));
        }
        if self.peek_is("(") {
            self.advance();
            if self.peek_is(")") {
                self.advance();
                return Ok(Tree::leaf("()", "()"));
            }
            if self.peek_kind() != Some(TokenKind::Identifier) {
                return Err(self.syntax_error("identifier or ')' expected"));
            }
            let t = self.advance();
            let first = Tree::leaf("identifier", t.text);
            let node = if self.peek_is(",") {
                self.advance();
                self.parse_vl_from(first)?
            } else {
                first
            };
            self.expect(")")?;
            return Ok(node);
        }
        Err(self.syntax_error("identifier or '(' expected"))
    }

    // Vl -> identifier (',' identifier)*, merged with a variable already
    // consumed by the caller (mirrors the original grammar's shared node
    // stack, where Vl's build_tree also swallows the caller's pending node).
    fn parse_vl_from(&mut self, first: Tree) -> Result<Tree, RpalError> {
        let mut names = vec![first];
        while self.peek_is(",") {
            self.advance();
            if self.peek_kind() != Some(TokenKind::Identifier) {
                return Err(self.syntax_error("identifier expected"));
            }
            let t = self.advance();
            names.push(Tree::leaf("identifier", t.text));
        }
        Ok(Tree::node(",", names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(src: &str) -> Tree {
        let tokens = tokenize(src).unwrap();
        parse(&tokens).unwrap()
    }

    #[test]
    fn simple_let() {
        let tree = parse_source("let x = 5 in Print x");
        assert_eq!(tree.label, "let");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].label, "=");
    }

    #[test]
    fn tuple_destructuring_param() {
        let tree = parse_source("let P (x,y) = x+y in Print(P(3,4))");
        assert_eq!(tree.label, "let");
        let fcn = &tree.children[0];
        assert_eq!(fcn.label, "fcn_form");
        assert_eq!(fcn.children[1].label, ",");
    }

    #[test]
    fn conditional_has_three_children() {
        let tree = parse_source("1 eq 1 -> 2 | 3");
        assert_eq!(tree.label, "->");
        assert_eq!(tree.children.len(), 3);
    }

    #[test]
    fn rejects_trailing_garbage() {
        let tokens = tokenize("5 )").unwrap();
        assert!(parse(&tokens).is_err());
    }
}
