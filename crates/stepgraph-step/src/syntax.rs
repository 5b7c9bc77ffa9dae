//! Part 21 (STEP physical file format) syntax layer.
//!
//! A single-pass scanner that collects the `#id = KIND(args);` records
//! from the DATA section into an [`EntityMap`]. Header statements and
//! section markers are skipped. Complex (multi-typed) records such as
//! `#5 = ( A(...) B(...) );` are kept as a list of typed components.

use std::collections::BTreeMap;

use crate::error::StepError;

/// A parsed argument value inside an entity record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Entity reference, `#123`.
    Ref(u64),
    /// String literal, quotes and `''` escapes resolved.
    Str(String),
    /// Real number, `1.5E-2`.
    Real(f64),
    /// Integer number.
    Int(i64),
    /// Enumeration, `.TRUE.` becomes `Enum("TRUE")`.
    Enum(String),
    /// Parenthesized aggregate, `(1.0, 2.0, 3.0)`.
    List(Vec<Value>),
    /// Typed parameter or complex-record component, `KIND(args)`.
    Typed(String, Vec<Value>),
    /// Unset value, `$`.
    Unset,
    /// Derived value, `*`.
    Derived,
}

impl Value {
    /// The entity id if this is a reference.
    pub fn as_ref_id(&self) -> Option<u64> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }

    /// The string contents if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value, widening integers to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The elements if this is a parenthesized aggregate.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A single `#id = ...;` record from the DATA section.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Instance id.
    pub id: u64,
    /// Entity kind, uppercased. Empty for complex records.
    pub kind: String,
    /// Arguments. For complex records these are the typed components.
    pub args: Vec<Value>,
}

impl Entity {
    /// Whether this entity is of the given kind, including complex
    /// records carrying the kind as one of their components.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.args_of(kind).is_some()
    }

    /// The argument list for `kind`: the record's own arguments when the
    /// kinds match, or the matching component of a complex record.
    pub fn args_of(&self, kind: &str) -> Option<&[Value]> {
        if self.kind == kind {
            return Some(&self.args);
        }
        if self.kind.is_empty() {
            for arg in &self.args {
                if let Value::Typed(k, args) = arg {
                    if k == kind {
                        return Some(args);
                    }
                }
            }
        }
        None
    }

    /// Argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }
}

/// All entity records of a file, keyed and iterated by instance id.
#[derive(Debug, Default)]
pub struct EntityMap {
    entities: BTreeMap<u64, Entity>,
}

impl EntityMap {
    /// Parse the records out of a full Part 21 file.
    pub fn parse(text: &str) -> Result<Self, StepError> {
        let mut scanner = Scanner::new(text.as_bytes());
        let mut entities = BTreeMap::new();
        loop {
            scanner.skip_trivia();
            match scanner.peek() {
                None => break,
                Some(b'#') => {
                    let entity = scanner.read_record()?;
                    entities.insert(entity.id, entity);
                }
                // Header statements and section markers end at ';'.
                Some(_) => scanner.skip_statement()?,
            }
        }
        Ok(Self { entities })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity by id.
    pub fn get(&self, id: u64) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Entity by id, or [`StepError::MissingEntity`].
    pub fn require(&self, id: u64) -> Result<&Entity, StepError> {
        self.get(id).ok_or(StepError::MissingEntity(id))
    }

    /// All entities of a kind, in ascending id order.
    pub fn of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Entity> {
        self.entities.values().filter(move |e| e.is_kind(kind))
    }
}

/// Byte scanner with line/column tracking.
struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.input.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn error(&self, message: impl Into<String>) -> StepError {
        StepError::syntax(self.line, self.col, message)
    }

    /// Skip whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self) {
        loop {
            while let Some(ch) = self.peek() {
                if ch.is_ascii_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }
            if self.pos + 1 < self.input.len()
                && self.input[self.pos] == b'/'
                && self.input[self.pos + 1] == b'*'
            {
                self.advance();
                self.advance();
                while self.pos + 1 < self.input.len() {
                    if self.input[self.pos] == b'*' && self.input[self.pos + 1] == b'/' {
                        self.advance();
                        self.advance();
                        break;
                    }
                    self.advance();
                }
                continue;
            }
            break;
        }
    }

    /// Skip a non-record statement through its terminating ';',
    /// honoring string literals that may contain semicolons.
    fn skip_statement(&mut self) -> Result<(), StepError> {
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated statement")),
                Some(b';') => return Ok(()),
                Some(b'\'') => {
                    self.read_string_tail()?;
                }
                Some(_) => {}
            }
        }
    }

    /// `#id = KIND(args);` or `#id = ( KIND(args) ... );`.
    fn read_record(&mut self) -> Result<Entity, StepError> {
        let id = self.read_ref()?;
        self.skip_trivia();
        if self.advance() != Some(b'=') {
            return Err(self.error(format!("expected '=' after #{id}")));
        }
        self.skip_trivia();
        let (kind, args) = match self.peek() {
            Some(b'(') => {
                // Complex record: a parenthesized run of typed components.
                self.advance();
                let mut components = Vec::new();
                loop {
                    self.skip_trivia();
                    match self.peek() {
                        Some(b')') => {
                            self.advance();
                            break;
                        }
                        Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => {
                            let kind = self.read_keyword();
                            self.skip_trivia();
                            let args = self.read_arg_list()?;
                            components.push(Value::Typed(kind, args));
                        }
                        _ => return Err(self.error("expected component in complex record")),
                    }
                }
                (String::new(), components)
            }
            Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => {
                let kind = self.read_keyword();
                self.skip_trivia();
                let args = self.read_arg_list()?;
                (kind, args)
            }
            _ => return Err(self.error(format!("expected entity kind after #{id} ="))),
        };
        self.skip_trivia();
        if self.advance() != Some(b';') {
            return Err(self.error(format!("expected ';' after #{id}")));
        }
        Ok(Entity { id, kind, args })
    }

    /// `( value, value, ... )`.
    fn read_arg_list(&mut self) -> Result<Vec<Value>, StepError> {
        if self.advance() != Some(b'(') {
            return Err(self.error("expected '('"));
        }
        let mut args = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(self.error("unterminated argument list")),
                Some(b')') => {
                    self.advance();
                    return Ok(args);
                }
                Some(b',') => {
                    self.advance();
                }
                Some(_) => args.push(self.read_value()?),
            }
        }
    }

    fn read_value(&mut self) -> Result<Value, StepError> {
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some(b'#') => Ok(Value::Ref(self.read_ref()?)),
            Some(b'\'') => {
                self.advance();
                Ok(Value::Str(self.read_string_tail()?))
            }
            Some(b'.') => self.read_enum(),
            Some(b'(') => Ok(Value::List(self.read_arg_list()?)),
            Some(b'$') => {
                self.advance();
                Ok(Value::Unset)
            }
            Some(b'*') => {
                self.advance();
                Ok(Value::Derived)
            }
            Some(ch) if ch.is_ascii_digit() || ch == b'-' || ch == b'+' => self.read_number(),
            Some(ch) if ch.is_ascii_alphabetic() || ch == b'_' => {
                let kind = self.read_keyword();
                self.skip_trivia();
                let args = self.read_arg_list()?;
                Ok(Value::Typed(kind, args))
            }
            Some(ch) => Err(self.error(format!("unexpected character: '{}'", ch as char))),
        }
    }

    fn read_ref(&mut self) -> Result<u64, StepError> {
        self.advance(); // '#'
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("expected digits after '#'"));
        }
        let digits = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid entity id"))?;
        digits
            .parse()
            .map_err(|_| self.error(format!("invalid entity id: {digits}")))
    }

    /// Reads string contents after the opening quote was consumed.
    /// A doubled quote is an escaped quote.
    fn read_string_tail(&mut self) -> Result<String, StepError> {
        let mut content = Vec::new();
        loop {
            match self.advance() {
                None => return Err(self.error("unterminated string")),
                Some(b'\'') => {
                    if self.peek() == Some(b'\'') {
                        content.push(b'\'');
                        self.advance();
                    } else {
                        return Ok(String::from_utf8_lossy(&content).into_owned());
                    }
                }
                Some(ch) => content.push(ch),
            }
        }
    }

    fn read_enum(&mut self) -> Result<Value, StepError> {
        self.advance(); // opening '.'
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == b'_' {
                self.advance();
            } else {
                break;
            }
        }
        if self.advance() != Some(b'.') {
            return Err(self.error("unterminated enumeration"));
        }
        let name = std::str::from_utf8(&self.input[start..self.pos - 1])
            .map_err(|_| self.error("invalid enumeration"))?;
        if name.is_empty() {
            return Err(self.error("empty enumeration"));
        }
        Ok(Value::Enum(name.to_string()))
    }

    fn read_number(&mut self) -> Result<Value, StepError> {
        let start = self.pos;
        let mut is_real = false;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.advance();
        }
        while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            self.advance();
        }
        if self.peek() == Some(b'.') {
            is_real = true;
            self.advance();
            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'E' | b'e')) {
            is_real = true;
            self.advance();
            if matches!(self.peek(), Some(b'-' | b'+')) {
                self.advance();
            }
            while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                self.advance();
            }
        }
        let text = std::str::from_utf8(&self.input[start..self.pos])
            .map_err(|_| self.error("invalid number"))?;
        if is_real {
            text.parse()
                .map(Value::Real)
                .map_err(|_| self.error(format!("invalid real number: {text}")))
        } else {
            text.parse()
                .map(Value::Int)
                .map_err(|_| self.error(format!("invalid integer: {text}")))
        }
    }

    fn read_keyword(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            // Hyphens appear in section identifiers like ISO-10303-21.
            if ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'-' {
                self.advance();
            } else {
                break;
            }
        }
        String::from_utf8_lossy(&self.input[start..self.pos]).to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_record() {
        let map = EntityMap::parse("#1 = CARTESIAN_POINT('', (0.0, 1.5E-2, -3.0));").unwrap();
        let e = map.require(1).unwrap();
        assert_eq!(e.kind, "CARTESIAN_POINT");
        assert_eq!(e.arg(0), Some(&Value::Str(String::new())));
        let coords = e.arg(1).and_then(Value::as_list).unwrap();
        assert_eq!(coords[1].as_f64(), Some(0.015));
        assert_eq!(coords[2].as_f64(), Some(-3.0));
    }

    #[test]
    fn skips_header_and_section_markers() {
        let text = "ISO-10303-21;\nHEADER;\nFILE_NAME('a;b','2024',(''),(''),'','','');\nENDSEC;\nDATA;\n#2 = PRODUCT('id','Bracket','',(#3));\nENDSEC;\nEND-ISO-10303-21;";
        let map = EntityMap::parse(text).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.require(2).unwrap().kind, "PRODUCT");
    }

    #[test]
    fn resolves_escaped_quotes() {
        let map = EntityMap::parse("#1 = PRODUCT('x','it''s','',());").unwrap();
        assert_eq!(map.require(1).unwrap().arg(1).unwrap().as_str(), Some("it's"));
    }

    #[test]
    fn parses_unset_derived_and_enum() {
        let map = EntityMap::parse("#7 = ADVANCED_FACE('',(#2),#3,.F.,$,*);").unwrap();
        let e = map.require(7).unwrap();
        assert_eq!(e.arg(3), Some(&Value::Enum("F".into())));
        assert_eq!(e.arg(4), Some(&Value::Unset));
        assert_eq!(e.arg(5), Some(&Value::Derived));
    }

    #[test]
    fn parses_complex_record() {
        let text = "#10 = ( GEOMETRIC_REPRESENTATION_CONTEXT(3) GLOBAL_UNIT_ASSIGNED_CONTEXT((#4)) REPRESENTATION_CONTEXT('','') );";
        let map = EntityMap::parse(text).unwrap();
        let e = map.require(10).unwrap();
        assert!(e.kind.is_empty());
        assert!(e.is_kind("GEOMETRIC_REPRESENTATION_CONTEXT"));
        let args = e.args_of("GEOMETRIC_REPRESENTATION_CONTEXT").unwrap();
        assert_eq!(args[0], Value::Int(3));
    }

    #[test]
    fn missing_entity_is_an_error() {
        let map = EntityMap::parse("#1 = PRODUCT('a','b','',());").unwrap();
        assert!(matches!(map.require(9), Err(StepError::MissingEntity(9))));
    }

    #[test]
    fn reports_syntax_position() {
        let err = EntityMap::parse("#1 = \n?;").unwrap_err();
        match err {
            StepError::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn of_kind_iterates_in_id_order() {
        let text = "#5 = CARTESIAN_POINT('',(0.,0.,0.));\n#2 = CARTESIAN_POINT('',(1.,1.,1.));\n#3 = DIRECTION('',(0.,0.,1.));";
        let map = EntityMap::parse(text).unwrap();
        let ids: Vec<u64> = map.of_kind("CARTESIAN_POINT").map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }
}
