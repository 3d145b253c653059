//! Recursive-descent parser over the XPath 1.0 expression grammar.
//!
//! Besides syntax, the parser rejects unknown functions, wrong argument
//! counts and node-set operations applied to non-node-set operands, so every
//! selector error is known before evaluation.

use super::ast::{ArithmeticOp, Axis, CompareOp, Expr, Function, LocationPath, NodeTest, Step};
use super::lexer::{tokenize, Token};

/// Nesting limit for parenthesised groups, predicates and function arguments
const MAX_DEPTH: usize = 128;

pub(crate) fn parse_expr(input: &str) -> Result<Expr, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;
    if let Some(token) = parser.peek() {
        return Err(format!("unexpected {} after end of expression", describe(token)));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), String> {
        if self.eat(expected) {
            return Ok(());
        }
        Err(match self.peek() {
            Some(found) => format!("expected {}, found {}", describe(expected), describe(found)),
            None => format!("expected {}, found end of expression", describe(expected)),
        })
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        if self.depth >= MAX_DEPTH {
            return Err("selector nested too deeply".to_string());
        }
        self.depth += 1;
        let expr = self.or_chain();
        self.depth -= 1;
        expr
    }

    fn or_chain(&mut self) -> Result<Expr, String> {
        let mut lhs = self.and_expr()?;
        while self.eat(&Token::Or) {
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.equality_expr()?;
        while self.eat(&Token::And) {
            let rhs = self.equality_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn equality_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.relational_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => CompareOp::Eq,
                Some(Token::NotEq) => CompareOp::NotEq,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.relational_expr()?;
            lhs = Expr::Compare(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn relational_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.additive_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => CompareOp::Lt,
                Some(Token::LtEq) => CompareOp::LtEq,
                Some(Token::Gt) => CompareOp::Gt,
                Some(Token::GtEq) => CompareOp::GtEq,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.additive_expr()?;
            lhs = Expr::Compare(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn additive_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.multiplicative_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => ArithmeticOp::Add,
                Some(Token::Minus) => ArithmeticOp::Subtract,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.multiplicative_expr()?;
            lhs = Expr::Arithmetic(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn multiplicative_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.unary_expr()?;
        loop {
            let op = match self.peek() {
                Some(Token::Multiply) => ArithmeticOp::Multiply,
                Some(Token::Div) => ArithmeticOp::Divide,
                Some(Token::Mod) => ArithmeticOp::Modulo,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary_expr()?;
            lhs = Expr::Arithmetic(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary_expr(&mut self) -> Result<Expr, String> {
        let mut negations = 0usize;
        while self.eat(&Token::Minus) {
            negations += 1;
        }
        if negations > MAX_DEPTH {
            return Err("selector nested too deeply".to_string());
        }
        let mut expr = self.union_expr()?;
        for _ in 0..negations {
            expr = Expr::Negate(Box::new(expr));
        }
        Ok(expr)
    }

    fn union_expr(&mut self) -> Result<Expr, String> {
        let mut lhs = self.path_expr()?;
        while self.eat(&Token::Pipe) {
            let rhs = self.path_expr()?;
            if !lhs.is_node_set() || !rhs.is_node_set() {
                return Err("union operands must be node-sets".to_string());
            }
            lhs = Expr::Union(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn path_expr(&mut self) -> Result<Expr, String> {
        let starts_filter = match self.peek() {
            Some(Token::LParen | Token::Literal(_) | Token::Number(_)) => true,
            Some(Token::FunctionName(name)) => node_type_test(name).is_none(),
            _ => false,
        };
        if !starts_filter {
            return self.location_path().map(Expr::Path);
        }

        let primary = self.primary_expr()?;
        let predicates = self.predicates()?;
        let mut steps = Vec::new();
        if matches!(self.peek(), Some(Token::Slash | Token::DoubleSlash)) {
            self.relative_steps(&mut steps)?;
        }

        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        if !primary.is_node_set() {
            return Err("predicates and path steps require a node-set".to_string());
        }
        Ok(Expr::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    fn primary_expr(&mut self) -> Result<Expr, String> {
        match self.bump() {
            Some(Token::LParen) => {
                let expr = self.or_expr()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some(Token::Literal(value)) => Ok(Expr::Literal(value)),
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::FunctionName(name)) => self.function_call(&name),
            Some(other) => Err(format!("unexpected {}", describe(&other))),
            None => Err("unexpected end of expression".to_string()),
        }
    }

    fn function_call(&mut self, name: &str) -> Result<Expr, String> {
        let function =
            Function::from_name(name).ok_or_else(|| format!("unknown function '{name}()'"))?;

        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                args.push(self.or_expr()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma)?;
            }
        }

        let (min, max) = function.arity();
        if args.len() < min || max.is_some_and(|max| args.len() > max) {
            return Err(format!(
                "{name}() does not take {} argument(s)",
                args.len()
            ));
        }
        if function.takes_node_set() && args.iter().any(|arg| !arg.is_node_set()) {
            return Err(format!("{name}() expects a node-set argument"));
        }

        Ok(Expr::Call(function, args))
    }

    fn location_path(&mut self) -> Result<LocationPath, String> {
        let mut steps = Vec::new();
        match self.peek() {
            Some(Token::Slash) => {
                self.pos += 1;
                if self.starts_step() {
                    self.step_sequence(&mut steps)?;
                }
                Ok(LocationPath {
                    absolute: true,
                    steps,
                })
            }
            Some(Token::DoubleSlash) => {
                self.pos += 1;
                steps.push(Step::descendant_or_self_node());
                self.step_sequence(&mut steps)?;
                Ok(LocationPath {
                    absolute: true,
                    steps,
                })
            }
            _ => {
                self.step_sequence(&mut steps)?;
                Ok(LocationPath {
                    absolute: false,
                    steps,
                })
            }
        }
    }

    /// `Step (('/' | '//') Step)*`
    fn step_sequence(&mut self, steps: &mut Vec<Step>) -> Result<(), String> {
        steps.push(self.step()?);
        self.relative_steps(steps)
    }

    /// `(('/' | '//') Step)*`
    fn relative_steps(&mut self, steps: &mut Vec<Step>) -> Result<(), String> {
        loop {
            match self.peek() {
                Some(Token::Slash) => self.pos += 1,
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    steps.push(Step::descendant_or_self_node());
                }
                _ => return Ok(()),
            }
            steps.push(self.step()?);
        }
    }

    fn starts_step(&self) -> bool {
        match self.peek() {
            Some(
                Token::Name(_)
                | Token::Wildcard
                | Token::At
                | Token::Dot
                | Token::DotDot
                | Token::AxisName(_),
            ) => true,
            Some(Token::FunctionName(name)) => node_type_test(name).is_some(),
            _ => false,
        }
    }

    fn step(&mut self) -> Result<Step, String> {
        if self.eat(&Token::Dot) {
            return Ok(Step::new(Axis::SelfAxis, NodeTest::Node));
        }
        if self.eat(&Token::DotDot) {
            return Ok(Step::new(Axis::Parent, NodeTest::Node));
        }

        let axis = match self.peek() {
            Some(Token::At) => {
                self.pos += 1;
                Axis::Attribute
            }
            Some(Token::AxisName(name)) => {
                let axis = Axis::from_name(name).ok_or_else(|| format!("unknown axis '{name}'"))?;
                self.pos += 1;
                self.expect(&Token::DoubleColon)?;
                axis
            }
            _ => Axis::Child,
        };

        let test = self.node_test()?;
        let mut step = Step::new(axis, test);
        step.predicates = self.predicates()?;
        Ok(step)
    }

    fn node_test(&mut self) -> Result<NodeTest, String> {
        match self.bump() {
            Some(Token::Wildcard) => Ok(NodeTest::AnyName),
            Some(Token::Name(name)) => Ok(NodeTest::Name(name)),
            Some(Token::FunctionName(name)) => {
                let mut test =
                    node_type_test(&name).ok_or_else(|| format!("'{name}()' is not a node test"))?;
                self.expect(&Token::LParen)?;
                if matches!(test, NodeTest::ProcessingInstruction(_)) {
                    if let Some(Token::Literal(target)) = self.peek().cloned() {
                        self.pos += 1;
                        test = NodeTest::ProcessingInstruction(Some(target));
                    }
                }
                self.expect(&Token::RParen)?;
                Ok(test)
            }
            Some(other) => Err(format!("expected a node test, found {}", describe(&other))),
            None => Err("expected a node test, found end of expression".to_string()),
        }
    }

    fn predicates(&mut self) -> Result<Vec<Expr>, String> {
        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            if self.peek() == Some(&Token::RBracket) {
                return Err("empty predicate".to_string());
            }
            predicates.push(self.or_expr()?);
            self.expect(&Token::RBracket)?;
        }
        Ok(predicates)
    }
}

fn node_type_test(name: &str) -> Option<NodeTest> {
    Some(match name {
        "node" => NodeTest::Node,
        "text" => NodeTest::Text,
        "comment" => NodeTest::Comment,
        "processing-instruction" => NodeTest::ProcessingInstruction(None),
        _ => return None,
    })
}

fn describe(token: &Token) -> String {
    match token {
        Token::Slash => "'/'".into(),
        Token::DoubleSlash => "'//'".into(),
        Token::LBracket => "'['".into(),
        Token::RBracket => "']'".into(),
        Token::LParen => "'('".into(),
        Token::RParen => "')'".into(),
        Token::At => "'@'".into(),
        Token::Comma => "','".into(),
        Token::DoubleColon => "'::'".into(),
        Token::Dot => "'.'".into(),
        Token::DotDot => "'..'".into(),
        Token::Pipe => "'|'".into(),
        Token::Plus => "'+'".into(),
        Token::Minus => "'-'".into(),
        Token::Eq => "'='".into(),
        Token::NotEq => "'!='".into(),
        Token::Lt => "'<'".into(),
        Token::LtEq => "'<='".into(),
        Token::Gt => "'>'".into(),
        Token::GtEq => "'>='".into(),
        Token::Multiply => "'*'".into(),
        Token::And => "'and'".into(),
        Token::Or => "'or'".into(),
        Token::Div => "'div'".into(),
        Token::Mod => "'mod'".into(),
        Token::Wildcard => "'*'".into(),
        Token::Literal(value) => format!("literal '{value}'"),
        Token::Number(value) => format!("number {value}"),
        Token::Name(name) => format!("name '{name}'"),
        Token::FunctionName(name) => format!("'{name}('"),
        Token::AxisName(name) => format!("axis '{name}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn child(name: &str) -> Step {
        Step::new(Axis::Child, NodeTest::Name(name.to_string()))
    }

    #[test]
    fn parses_absolute_path() {
        let expr = parse_expr("/project/version").unwrap();
        assert_eq!(
            expr,
            Expr::Path(LocationPath {
                absolute: true,
                steps: vec![child("project"), child("version")],
            })
        );
    }

    #[test]
    fn expands_double_slash() {
        let expr = parse_expr("//plugin/@id").unwrap();
        assert_eq!(
            expr,
            Expr::Path(LocationPath {
                absolute: true,
                steps: vec![
                    Step::descendant_or_self_node(),
                    child("plugin"),
                    Step::new(Axis::Attribute, NodeTest::Name("id".into())),
                ],
            })
        );
    }

    #[test]
    fn parses_name_predicate() {
        let expr = parse_expr("*[name()='version']").unwrap();
        let mut step = Step::new(Axis::Child, NodeTest::AnyName);
        step.predicates.push(Expr::Compare(
            CompareOp::Eq,
            Box::new(Expr::Call(Function::Name, vec![])),
            Box::new(Expr::Literal("version".into())),
        ));
        assert_eq!(
            expr,
            Expr::Path(LocationPath {
                absolute: false,
                steps: vec![step],
            })
        );
    }

    #[test]
    fn lone_slash_selects_root() {
        assert_eq!(
            parse_expr("/").unwrap(),
            Expr::Path(LocationPath {
                absolute: true,
                steps: vec![],
            })
        );
    }

    #[test]
    fn operator_precedence() {
        let expr = parse_expr("1 + 2 * 3 = 7 or false()").unwrap();
        let Expr::Or(lhs, _) = expr else {
            panic!("expected or at the top");
        };
        let Expr::Compare(CompareOp::Eq, sum, _) = *lhs else {
            panic!("expected comparison");
        };
        assert!(matches!(*sum, Expr::Arithmetic(ArithmeticOp::Add, _, _)));
    }

    #[test]
    fn filter_expression_with_steps() {
        let expr = parse_expr("(//dependency)[1]/artifactId").unwrap();
        assert!(expr.is_node_set());
        assert!(matches!(expr, Expr::Filter { ref steps, .. } if steps.len() == 1));
    }

    #[test]
    fn rejects_malformed_selectors() {
        for selector in [
            "/project/",
            "/project[",
            "/project[]",
            "project]",
            "foo(1)",
            "count()",
            "count('a')",
            "'a' | /b",
            "'a'[1]",
            "bogus::x",
            "/project/text(",
            "1 +",
        ] {
            assert!(parse_expr(selector).is_err(), "{selector} should fail");
        }
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let selector = format!("{}/project{}", "(".repeat(20_000), ")".repeat(20_000));
        assert_eq!(
            parse_expr(&selector),
            Err("selector nested too deeply".to_string())
        );

        let predicates = format!("/a{}", "[b".repeat(5_000) + &"]".repeat(5_000));
        assert!(parse_expr(&predicates).is_err());

        let negations = format!("{}1", "-".repeat(20_000));
        assert!(parse_expr(&negations).is_err());
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let selector = format!("{}/project{}", "(".repeat(32), ")".repeat(32));
        assert!(parse_expr(&selector).is_ok());
        assert!(parse_expr("- - -1").is_ok());
    }
}
