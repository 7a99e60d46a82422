//! Recursive descent grammar producing the raw AST.
//!
//! Values are only lexically typed here: a bare `42` becomes an integer
//! term holding the text `"42"`. The coercion pass turns the text into the
//! declared type afterwards. Variables are substituted and function calls
//! are instantiated while parsing.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::ast::walk::propagate_default_field;
use crate::ast::{
    Conjunction, Exists, FieldGroup, FunctionCall, FunctionParam, GeoBox, GeoDistance,
    LogicalGroup, Negation, Node, Range, RangeBound, RangeOperator, RangeValue, Regexp, Scalar,
    Term, Wildcard,
};
use crate::error::{Result, XluceneError};
use crate::function::{FunctionContext, FunctionRegistry};
use crate::geo::{Distance, GeoBoundingBox, parse_geo_point_str};
use crate::parser::Variables;
use crate::types::{FieldType, TypeConfig};
use crate::util::wildcard::has_wildcard;

lazy_static! {
    static ref FLOAT_PATTERN: Regex = Regex::new(r"^-?(?:\d+\.\d*|\.\d+)(?:[eE][+-]?\d+)?$").unwrap();
}

/// Everything the grammar needs besides the query text.
pub(crate) struct GrammarContext<'a> {
    pub type_config: &'a TypeConfig,
    pub registry: &'a FunctionRegistry,
    pub variables: &'a Variables,
    pub filter_nil_variables: bool,
}

/// Parse `query` into a raw AST.
pub(crate) fn parse_query<'a>(query: &'a str, context: &'a GrammarContext<'a>) -> Result<Node> {
    let mut parser = QueryGrammar::new(query, context);
    parser.skip_whitespace();
    if parser.at_end() {
        return Ok(Node::Empty);
    }

    let flow = parser.parse_flow()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.expected("end of input"));
    }

    Ok(into_node(flow))
}

/// A lone node stands for itself, anything else is a logical group.
fn into_node(mut flow: Vec<Conjunction>) -> Node {
    if flow.is_empty() {
        return Node::Empty;
    }
    if flow.len() == 1 && flow[0].nodes.len() == 1 {
        if let Some(node) = flow.pop().and_then(|mut c| c.nodes.pop()) {
            return node;
        }
    }
    Node::LogicalGroup(LogicalGroup { flow })
}

/// Lexical type of a bare word.
pub(crate) fn lexical_type(text: &str) -> FieldType {
    if text.parse::<i64>().is_ok() {
        FieldType::Integer
    } else if FLOAT_PATTERN.is_match(text) {
        FieldType::Float
    } else {
        FieldType::String
    }
}

fn scalar_type(scalar: &Scalar) -> FieldType {
    match scalar {
        Scalar::String(_) => FieldType::String,
        Scalar::Integer(_) => FieldType::Integer,
        Scalar::Float(_) => FieldType::Float,
        Scalar::Boolean(_) => FieldType::Boolean,
    }
}

fn is_field_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '*' | '?' | '@' | '#')
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn negation(node: Node) -> Node {
    match node {
        Node::Empty => Node::Empty,
        node => Node::Negation(Negation {
            node: Box::new(node),
        }),
    }
}

fn conjunction(nodes: Vec<Node>) -> Conjunction {
    Conjunction::new(nodes.into_iter().filter(|n| !matches!(n, Node::Empty)).collect())
}

struct QueryGrammar<'a> {
    query: &'a str,
    chars: Vec<char>,
    pos: usize,
    context: &'a GrammarContext<'a>,
}

impl<'a> QueryGrammar<'a> {
    fn new(query: &'a str, context: &'a GrammarContext<'a>) -> Self {
        QueryGrammar {
            query,
            chars: query.chars().collect(),
            pos: 0,
            context,
        }
    }

    // ---- cursor helpers ----

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn looking_at(&self, s: &str) -> bool {
        s.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn eat_str(&mut self, s: &str) -> bool {
        if self.looking_at(s) {
            self.pos += s.chars().count();
            true
        } else {
            false
        }
    }

    /// An uppercase operator keyword followed by whitespace or a group.
    fn peek_keyword(&self, keyword: &str) -> bool {
        if !self.looking_at(keyword) {
            return false;
        }
        match self.peek_at(keyword.len()) {
            None => true,
            Some(c) => c.is_whitespace() || c == '(',
        }
    }

    fn at_group_end(&self) -> bool {
        self.at_end() || self.peek() == Some(')')
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn expected(&self, what: &str) -> XluceneError {
        let found = match self.peek() {
            Some(c) => format!("\"{c}\" found"),
            None => "end of input found".to_string(),
        };
        XluceneError::parse_at(self.query, format!("Expected {what} but {found}"), self.pos)
    }

    fn error_at<S: Into<String>>(&self, message: S, position: usize) -> XluceneError {
        XluceneError::parse_at(self.query, message, position)
    }

    // ---- boolean structure ----

    /// Conjunctions separated by `OR`, `||` or plain juxtaposition.
    fn parse_flow(&mut self) -> Result<Vec<Conjunction>> {
        let mut flow = Vec::new();
        let mut first = true;

        loop {
            self.skip_whitespace();
            if self.at_group_end() {
                break;
            }
            if !first && (self.peek_keyword("OR") || self.looking_at("||")) {
                self.pos += 2;
                self.skip_whitespace();
                if self.at_group_end() {
                    return Err(self.expected("term after OR"));
                }
            }

            let conj = self.parse_conjunction()?;
            if !conj.nodes.is_empty() {
                flow.push(conj);
            }
            first = false;
        }

        Ok(flow)
    }

    fn parse_conjunction(&mut self) -> Result<Conjunction> {
        let mut nodes = vec![self.parse_unary()?];

        loop {
            let save = self.pos;
            self.skip_whitespace();
            if self.peek_keyword("AND") {
                self.pos += 3;
            } else if self.looking_at("&&") {
                self.pos += 2;
            } else {
                self.pos = save;
                break;
            }
            self.skip_whitespace();
            if self.at_group_end() {
                return Err(self.expected("term after AND"));
            }
            nodes.push(self.parse_unary()?);
        }

        Ok(conjunction(nodes))
    }

    fn parse_unary(&mut self) -> Result<Node> {
        if self.peek_keyword("NOT") {
            self.pos += 3;
            self.skip_whitespace();
            return Ok(negation(self.parse_unary()?));
        }
        if self.peek() == Some('!') {
            self.pos += 1;
            self.skip_whitespace();
            return Ok(negation(self.parse_unary()?));
        }
        if self.peek() == Some('-') && self.peek_at(1).is_some_and(|c| !c.is_whitespace()) {
            self.pos += 1;
            return Ok(negation(self.parse_unary()?));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Node> {
        match self.peek() {
            None | Some(')') => return Err(self.expected("term")),
            Some('(') => {
                self.pos += 1;
                let flow = self.parse_flow()?;
                if !self.eat(')') {
                    return Err(self.expected("\")\""));
                }
                return Ok(if flow.is_empty() {
                    Node::Empty
                } else {
                    Node::LogicalGroup(LogicalGroup { flow })
                });
            }
            _ => {}
        }

        if self.peek_keyword("AND")
            || self.peek_keyword("OR")
            || self.looking_at("&&")
            || self.looking_at("||")
        {
            return Err(self.expected("term"));
        }

        if self.eat_str("_exists_:") {
            let field = self.parse_field_name()?;
            return Ok(Node::Exists(Exists { field }));
        }

        if let Some(field) = self.try_field() {
            self.skip_whitespace();
            return self.parse_field_value(field);
        }

        self.parse_value(None)
    }

    // ---- fields ----

    fn parse_field_name(&mut self) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_field_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.expected("field name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Consume `field:` if the cursor is on one.
    fn try_field(&mut self) -> Option<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_field_char) {
            self.pos += 1;
        }
        if self.pos > start && self.peek() == Some(':') {
            let field: String = self.chars[start..self.pos].iter().collect();
            self.pos += 1;
            return Some(field);
        }
        self.pos = start;
        None
    }

    fn parse_field_value(&mut self, field: String) -> Result<Node> {
        if self.peek() == Some('(') {
            return self.parse_field_group(field);
        }
        if let Some(name) = self.try_function_name() {
            return self.parse_function(field, name);
        }
        self.parse_value(Some(field))
    }

    fn parse_field_group(&mut self, field: String) -> Result<Node> {
        self.pos += 1;
        self.skip_whitespace();

        if self.looking_at("_geo_") {
            let node = self.parse_legacy_geo(field)?;
            self.skip_whitespace();
            if !self.eat(')') {
                return Err(self.expected("\")\""));
            }
            return Ok(node);
        }

        let flow = self.parse_flow()?;
        if !self.eat(')') {
            return Err(self.expected("\")\""));
        }
        if flow.is_empty() {
            return Ok(Node::Empty);
        }

        let flow = flow
            .into_iter()
            .map(|c| {
                Conjunction::new(
                    c.nodes
                        .into_iter()
                        .map(|n| propagate_default_field(n, &field))
                        .collect(),
                )
            })
            .collect();
        Ok(Node::FieldGroup(FieldGroup { field, flow }))
    }

    /// `field:(_geo_point_:"lat,lon" _geo_distance_:5km)` and
    /// `field:(_geo_box_top_left_:"lat,lon" _geo_box_bottom_right_:"lat,lon")`
    fn parse_legacy_geo(&mut self, field: String) -> Result<Node> {
        let start = self.pos;
        let mut params: Vec<(String, String)> = Vec::new();

        loop {
            self.skip_whitespace();
            if self.at_group_end() {
                break;
            }
            let key = self.parse_identifier("geo parameter")?;
            if !self.eat(':') {
                return Err(self.expected("\":\""));
            }
            self.skip_whitespace();
            let value = if self.peek() == Some('"') {
                self.parse_quoted()?
            } else {
                self.parse_bare_word(&[')'])?.1
            };
            params.push((key, value));
        }

        let param = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let invalid = |e: XluceneError| self.error_at(e.to_string(), start);

        if let (Some(point), Some(distance)) = (param("_geo_point_"), param("_geo_distance_")) {
            let point = parse_geo_point_str(point).map_err(invalid)?;
            let distance: Distance = distance.parse().map_err(invalid)?;
            return Ok(Node::GeoDistance(GeoDistance {
                field,
                field_type: FieldType::GeoPoint,
                lat: point.lat,
                lon: point.lon,
                distance: distance.distance,
                unit: distance.unit,
            }));
        }

        if let (Some(top_left), Some(bottom_right)) =
            (param("_geo_box_top_left_"), param("_geo_box_bottom_right_"))
        {
            let top_left = parse_geo_point_str(top_left).map_err(invalid)?;
            let bottom_right = parse_geo_point_str(bottom_right).map_err(invalid)?;
            let bbox = GeoBoundingBox::new(top_left, bottom_right).map_err(invalid)?;
            return Ok(Node::GeoBoundingBox(GeoBox {
                field,
                field_type: FieldType::GeoPoint,
                top_left: bbox.top_left,
                bottom_right: bbox.bottom_right,
            }));
        }

        Err(self.error_at(
            "Expected _geo_point_ with _geo_distance_, or _geo_box_top_left_ with _geo_box_bottom_right_",
            start,
        ))
    }

    // ---- functions ----

    fn parse_identifier(&mut self, what: &str) -> Result<String> {
        let start = self.pos;
        while self.peek().is_some_and(is_identifier_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.expected(what));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Consume `name(` if the cursor is on a function call.
    fn try_function_name(&mut self) -> Option<String> {
        let start = self.pos;
        if !self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        while self.peek().is_some_and(is_identifier_char) {
            self.pos += 1;
        }
        if self.peek() == Some('(') {
            let name: String = self.chars[start..self.pos].iter().collect();
            self.pos += 1;
            return Some(name);
        }
        self.pos = start;
        None
    }

    fn parse_function(&mut self, field: String, name: String) -> Result<Node> {
        let start = self.pos - name.chars().count() - 1;
        if self.context.registry.get(&name).is_none() {
            return Err(self.error_at(
                format!("could not find an xlucene function with name \"{name}\""),
                start,
            ));
        }

        let params = self.parse_function_params()?;
        let instance = self.context.registry.create(&FunctionContext {
            name: &name,
            field: &field,
            field_type: self.context.type_config.get(&field),
            params: &params,
        })?;

        Ok(Node::Function(FunctionCall {
            field,
            name,
            params,
            instance,
        }))
    }

    fn skip_separators(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace() || c == ',') {
            self.pos += 1;
        }
    }

    fn parse_function_params(&mut self) -> Result<Vec<FunctionParam>> {
        let mut params = Vec::new();
        loop {
            self.skip_separators();
            match self.peek() {
                Some(')') => {
                    self.pos += 1;
                    return Ok(params);
                }
                None => return Err(self.expected("\")\"")),
                _ => {}
            }

            let name = self.parse_identifier("parameter name")?;
            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.expected("\":\""));
            }
            self.skip_whitespace();
            if let Some(value) = self.parse_param_value()? {
                params.push(FunctionParam { name, value });
            }
        }
    }

    fn parse_param_value(&mut self) -> Result<Option<Value>> {
        match self.peek() {
            Some('"') => Ok(Some(Value::String(self.parse_quoted()?))),
            Some('[') => {
                self.pos += 1;
                let mut items = Vec::new();
                loop {
                    self.skip_separators();
                    match self.peek() {
                        Some(']') => {
                            self.pos += 1;
                            return Ok(Some(Value::Array(items)));
                        }
                        None => return Err(self.expected("\"]\"")),
                        _ => {}
                    }
                    if let Some(item) = self.parse_param_value()? {
                        items.push(item);
                    }
                }
            }
            Some('$') => {
                let name = self.parse_variable_name()?;
                Ok(self.lookup_variable(&name)?.cloned())
            }
            _ => {
                let (_, text) = self.parse_bare_word(&[',', ')', ']'])?;
                Ok(Some(json_scalar(&text)))
            }
        }
    }

    // ---- values ----

    fn parse_value(&mut self, field: Option<String>) -> Result<Node> {
        match self.peek() {
            Some('"') => {
                let text = self.parse_quoted()?;
                let mut term = Term::new(field.as_deref(), FieldType::String, Scalar::String(text));
                term.quoted = true;
                Ok(Node::Term(term))
            }
            Some('/') => {
                let value = self.parse_regex()?;
                Ok(Node::Regexp(Regexp {
                    field,
                    field_type: FieldType::String,
                    value,
                }))
            }
            Some('$') => {
                let name = self.parse_variable_name()?;
                self.variable_node(field, &name)
            }
            Some('[') | Some('{') => self.parse_range(field),
            Some('>') | Some('<') => self.parse_comparison(field),
            _ => {
                let (raw, text) = self.parse_bare_word(&[])?;
                if has_wildcard(&raw) {
                    return Ok(Node::Wildcard(Wildcard {
                        field,
                        field_type: FieldType::String,
                        value: raw,
                    }));
                }
                let mut term = Term::new(field.as_deref(), lexical_type(&text), Scalar::String(text));
                term.restricted = true;
                Ok(Node::Term(term))
            }
        }
    }

    /// A run of non-whitespace characters. Returns the raw text (escapes
    /// kept) and the unescaped text.
    fn parse_bare_word(&mut self, stop: &[char]) -> Result<(String, String)> {
        let mut raw = String::new();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '(' || c == ')' || stop.contains(&c) {
                break;
            }
            self.pos += 1;
            if c == '\\' {
                raw.push('\\');
                match self.bump() {
                    Some(escaped) => {
                        raw.push(escaped);
                        text.push(escaped);
                    }
                    None => text.push('\\'),
                }
                continue;
            }
            raw.push(c);
            text.push(c);
        }

        if raw.is_empty() {
            return Err(self.expected("term"));
        }
        Ok((raw, text))
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some(escaped) => text.push(escaped),
                    None => break,
                },
                Some(c) => text.push(c),
                None => break,
            }
        }
        Err(self.error_at("Expected closing \"\"\" for quoted value", start))
    }

    fn parse_regex(&mut self) -> Result<String> {
        let start = self.pos;
        self.pos += 1;
        let mut pattern = String::new();
        loop {
            match self.bump() {
                Some('/') => return Ok(pattern),
                Some('\\') => match self.bump() {
                    Some('/') => pattern.push('/'),
                    Some(escaped) => {
                        pattern.push('\\');
                        pattern.push(escaped);
                    }
                    None => break,
                },
                Some(c) => pattern.push(c),
                None => break,
            }
        }
        Err(self.error_at("Expected closing \"/\" for regular expression", start))
    }

    // ---- ranges ----

    fn parse_range(&mut self, field: Option<String>) -> Result<Node> {
        let left_operator = match self.bump() {
            Some('[') => RangeOperator::Gte,
            _ => RangeOperator::Gt,
        };
        self.skip_whitespace();
        let left = self.parse_range_value(&[']', '}'])?;
        self.skip_whitespace();
        if !self.peek_keyword("TO") {
            return Err(self.expected("\"TO\""));
        }
        self.pos += 2;
        self.skip_whitespace();
        let right = self.parse_range_value(&[']', '}'])?;
        self.skip_whitespace();
        let right_operator = match self.peek() {
            Some(']') => RangeOperator::Lte,
            Some('}') => RangeOperator::Lt,
            _ => return Err(self.expected("\"]\" or \"}\"")),
        };
        self.pos += 1;

        let (Some((left, left_type)), Some((right, right_type))) = (left, right) else {
            return Ok(Node::Empty);
        };
        Ok(Node::Range(Range {
            field,
            field_type: range_type(&[left_type, right_type]),
            left: RangeBound::new(left_operator, left),
            right: Some(RangeBound::new(right_operator, right)),
        }))
    }

    fn parse_comparison(&mut self, field: Option<String>) -> Result<Node> {
        let operator = if self.eat_str(">=") {
            RangeOperator::Gte
        } else if self.eat_str("<=") {
            RangeOperator::Lte
        } else if self.eat('>') {
            RangeOperator::Gt
        } else {
            self.pos += 1;
            RangeOperator::Lt
        };
        self.skip_whitespace();

        let Some((value, value_type)) = self.parse_range_value(&[])? else {
            return Ok(Node::Empty);
        };
        Ok(Node::Range(Range {
            field,
            field_type: range_type(&[value_type]),
            left: RangeBound::new(operator, value),
            right: None,
        }))
    }

    /// A bound and its lexical type (`None` for `*`). `Ok(None)` when the
    /// bound was a filtered nil variable.
    fn parse_range_value(
        &mut self,
        stop: &[char],
    ) -> Result<Option<(RangeValue, Option<FieldType>)>> {
        match self.peek() {
            Some('"') => {
                let text = self.parse_quoted()?;
                Ok(Some((
                    RangeValue::Value(Scalar::String(text)),
                    Some(FieldType::String),
                )))
            }
            Some('$') => {
                let position = self.pos;
                let name = self.parse_variable_name()?;
                let Some(value) = self.lookup_variable(&name)? else {
                    return Ok(None);
                };
                let scalar = Scalar::from_json(value).ok_or_else(|| {
                    self.error_at(
                        format!("variable \"{name}\" can not be used as a range bound"),
                        position,
                    )
                })?;
                let lexical = scalar_type(&scalar);
                Ok(Some((RangeValue::Value(scalar), Some(lexical))))
            }
            _ => {
                let (_, text) = self.parse_bare_word(stop)?;
                if text == "*" {
                    return Ok(Some((RangeValue::Infinity, None)));
                }
                let lexical = lexical_type(&text);
                Ok(Some((RangeValue::Value(Scalar::String(text)), Some(lexical))))
            }
        }
    }

    // ---- variables ----

    fn parse_variable_name(&mut self) -> Result<String> {
        self.pos += 1;
        self.parse_identifier("variable name")
    }

    /// `Ok(None)` when the variable is missing or null and nil variables
    /// are filtered.
    fn lookup_variable(&self, name: &str) -> Result<Option<&'a Value>> {
        let variables: &'a Variables = self.context.variables;
        match variables.get(name) {
            Some(Value::Null) | None if self.context.filter_nil_variables => Ok(None),
            Some(value) => Ok(Some(value)),
            None => Err(XluceneError::variable(format!(
                "Could not find a variable set with key \"{name}\""
            ))),
        }
    }

    fn variable_node(&self, field: Option<String>, name: &str) -> Result<Node> {
        let Some(value) = self.lookup_variable(name)? else {
            return Ok(Node::Empty);
        };

        let Value::Array(items) = value else {
            return Ok(self.variable_term(field, name, value)?.unwrap_or(Node::Empty));
        };

        let mut flow = Vec::new();
        for item in items {
            if let Some(node) = self.variable_term(field.clone(), name, item)? {
                flow.push(Conjunction::new(vec![node]));
            }
        }
        if flow.is_empty() {
            return Ok(Node::Empty);
        }
        Ok(Node::LogicalGroup(LogicalGroup { flow }))
    }

    fn variable_term(&self, field: Option<String>, name: &str, value: &Value) -> Result<Option<Node>> {
        if value.is_null() {
            if self.context.filter_nil_variables {
                return Ok(None);
            }
            return Err(XluceneError::variable(format!(
                "Variable \"{name}\" must not be null"
            )));
        }
        let scalar = Scalar::from_json(value).ok_or_else(|| {
            XluceneError::variable(format!(
                "Variable \"{name}\" must be a scalar or a list of scalars"
            ))
        })?;
        let field_type = scalar_type(&scalar);
        Ok(Some(Node::Term(Term::new(field.as_deref(), field_type, scalar))))
    }
}

/// Common lexical type of range bounds; unbounded sides don't count.
fn range_type(types: &[Option<FieldType>]) -> FieldType {
    let mut result = None;
    for field_type in types.iter().flatten() {
        result = Some(match (result, field_type) {
            (None, t) => *t,
            (Some(FieldType::Integer), FieldType::Integer) => FieldType::Integer,
            (Some(FieldType::Integer | FieldType::Float), FieldType::Integer | FieldType::Float) => {
                FieldType::Float
            }
            _ => FieldType::String,
        });
    }
    match result {
        Some(t @ (FieldType::Integer | FieldType::Float)) => t,
        _ => FieldType::String,
    }
}

/// JSON value of a bare function parameter.
fn json_scalar(text: &str) -> Value {
    let number = match lexical_type(text) {
        FieldType::Integer => text.parse::<i64>().ok().map(Value::from),
        FieldType::Float => text.parse::<f64>().ok().map(Value::from),
        _ => None,
    };
    if let Some(number) = number {
        return number;
    }
    match text {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(text.to_string()),
    }
}
