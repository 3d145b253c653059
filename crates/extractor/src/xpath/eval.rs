//! Tree-walking evaluator for compiled selectors.
//!
//! Evaluation is infallible: everything that could go wrong with a selector
//! has already been rejected by the parser.

use super::ast::{ArithmeticOp, Axis, CompareOp, Expr, Function, LocationPath, NodeTest, Step};
use crate::document::{MatchedNode, NodeKind};
use std::iter::successors;

#[derive(Debug, Clone)]
pub(crate) enum Value<'a, 'i: 'a> {
    Nodes(Vec<MatchedNode<'a, 'i>>),
    Boolean(bool),
    Number(f64),
    String(String),
}

impl<'a, 'i: 'a> Value<'a, 'i> {
    fn to_bool(&self) -> bool {
        match self {
            Self::Nodes(nodes) => !nodes.is_empty(),
            Self::Boolean(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::Nodes(_) | Self::String(_) => parse_number(&self.to_string_value()),
        }
    }

    fn to_string_value(&self) -> String {
        match self {
            Self::Nodes(nodes) => nodes.first().map(MatchedNode::text_content).unwrap_or_default(),
            Self::Boolean(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
        }
    }

    fn into_nodes(self) -> Vec<MatchedNode<'a, 'i>> {
        match self {
            Self::Nodes(nodes) => nodes,
            _ => Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
struct Context<'a, 'i: 'a> {
    node: MatchedNode<'a, 'i>,
    position: usize,
    size: usize,
}

/// Evaluate a node-set expression with `root` as the context node.
pub(crate) fn select<'a, 'i: 'a>(expr: &Expr, root: MatchedNode<'a, 'i>) -> Vec<MatchedNode<'a, 'i>> {
    let ctx = Context {
        node: root,
        position: 1,
        size: 1,
    };
    eval(expr, &ctx).into_nodes()
}

fn eval<'a, 'i: 'a>(expr: &Expr, ctx: &Context<'a, 'i>) -> Value<'a, 'i> {
    match expr {
        Expr::Or(lhs, rhs) => Value::Boolean(eval(lhs, ctx).to_bool() || eval(rhs, ctx).to_bool()),
        Expr::And(lhs, rhs) => {
            Value::Boolean(eval(lhs, ctx).to_bool() && eval(rhs, ctx).to_bool())
        }
        Expr::Compare(op, lhs, rhs) => Value::Boolean(compare(*op, &eval(lhs, ctx), &eval(rhs, ctx))),
        Expr::Arithmetic(op, lhs, rhs) => {
            let a = eval(lhs, ctx).to_number();
            let b = eval(rhs, ctx).to_number();
            Value::Number(match op {
                ArithmeticOp::Add => a + b,
                ArithmeticOp::Subtract => a - b,
                ArithmeticOp::Multiply => a * b,
                ArithmeticOp::Divide => a / b,
                ArithmeticOp::Modulo => a % b,
            })
        }
        Expr::Negate(operand) => Value::Number(-eval(operand, ctx).to_number()),
        Expr::Union(lhs, rhs) => {
            let mut nodes = eval(lhs, ctx).into_nodes();
            nodes.extend(eval(rhs, ctx).into_nodes());
            sort_document_order(&mut nodes);
            Value::Nodes(nodes)
        }
        Expr::Path(path) => Value::Nodes(eval_path(path, ctx)),
        Expr::Filter {
            primary,
            predicates,
            steps,
        } => {
            let mut nodes = eval(primary, ctx).into_nodes();
            for predicate in predicates {
                nodes = filter_by_predicate(nodes, predicate);
            }
            for step in steps {
                nodes = apply_step(&nodes, step);
            }
            Value::Nodes(nodes)
        }
        Expr::Literal(value) => Value::String(value.clone()),
        Expr::Number(value) => Value::Number(*value),
        Expr::Call(function, args) => call(*function, args, ctx),
    }
}

fn eval_path<'a, 'i: 'a>(path: &LocationPath, ctx: &Context<'a, 'i>) -> Vec<MatchedNode<'a, 'i>> {
    let start = if path.absolute {
        document_root(ctx.node)
    } else {
        ctx.node
    };

    let mut nodes = vec![start];
    for step in &path.steps {
        if nodes.is_empty() {
            break;
        }
        nodes = apply_step(&nodes, step);
    }
    nodes
}

fn apply_step<'a, 'i: 'a>(nodes: &[MatchedNode<'a, 'i>], step: &Step) -> Vec<MatchedNode<'a, 'i>> {
    let mut out = Vec::new();
    for &node in nodes {
        // Candidates stay in axis order so predicates see proximity positions
        let mut candidates: Vec<_> = axis_nodes(node, step.axis)
            .into_iter()
            .filter(|candidate| matches_test(candidate, &step.test, step.axis))
            .collect();
        for predicate in &step.predicates {
            candidates = filter_by_predicate(candidates, predicate);
        }
        out.extend(candidates);
    }

    if nodes.len() > 1 || step.axis.is_reverse() {
        sort_document_order(&mut out);
    }
    out
}

fn filter_by_predicate<'a, 'i: 'a>(
    nodes: Vec<MatchedNode<'a, 'i>>,
    predicate: &Expr,
) -> Vec<MatchedNode<'a, 'i>> {
    let size = nodes.len();
    nodes
        .into_iter()
        .enumerate()
        .filter(|&(index, node)| {
            let ctx = Context {
                node,
                position: index + 1,
                size,
            };
            match eval(predicate, &ctx) {
                Value::Number(n) => n == (index + 1) as f64,
                other => other.to_bool(),
            }
        })
        .map(|(_, node)| node)
        .collect()
}

fn sort_document_order(nodes: &mut Vec<MatchedNode<'_, '_>>) {
    nodes.sort_by_key(MatchedNode::order_key);
    nodes.dedup_by_key(|node| node.order_key());
}

fn document_root<'a, 'i: 'a>(node: MatchedNode<'a, 'i>) -> MatchedNode<'a, 'i> {
    let tree = node
        .as_tree_node()
        .or_else(|| node.attribute_owner())
        .map(|n| n.document().root());
    tree.map_or(node, MatchedNode::node)
}

fn axis_nodes<'a, 'i: 'a>(node: MatchedNode<'a, 'i>, axis: Axis) -> Vec<MatchedNode<'a, 'i>> {
    let Some(tree) = node.as_tree_node() else {
        return attribute_axis_nodes(node, axis);
    };

    match axis {
        Axis::Child => tree.children().map(MatchedNode::node).collect(),
        Axis::Descendant => tree.descendants().skip(1).map(MatchedNode::node).collect(),
        Axis::DescendantOrSelf => tree.descendants().map(MatchedNode::node).collect(),
        Axis::SelfAxis => vec![node],
        Axis::Parent => tree.parent().map(MatchedNode::node).into_iter().collect(),
        Axis::Ancestor => tree.ancestors().skip(1).map(MatchedNode::node).collect(),
        Axis::AncestorOrSelf => tree.ancestors().map(MatchedNode::node).collect(),
        Axis::FollowingSibling => successors(tree.next_sibling(), |n| n.next_sibling())
            .map(MatchedNode::node)
            .collect(),
        Axis::PrecedingSibling => successors(tree.prev_sibling(), |n| n.prev_sibling())
            .map(MatchedNode::node)
            .collect(),
        Axis::Following => following(tree),
        Axis::Preceding => preceding(tree),
        Axis::Attribute if tree.is_element() => (0..tree.attributes().count())
            .map(|index| MatchedNode::attribute(tree, index))
            .collect(),
        Axis::Attribute => Vec::new(),
    }
}

fn attribute_axis_nodes<'a, 'i: 'a>(
    node: MatchedNode<'a, 'i>,
    axis: Axis,
) -> Vec<MatchedNode<'a, 'i>> {
    let Some(owner) = node.attribute_owner() else {
        return Vec::new();
    };

    match axis {
        Axis::SelfAxis | Axis::DescendantOrSelf => vec![node],
        Axis::Parent => vec![MatchedNode::node(owner)],
        Axis::Ancestor => owner.ancestors().map(MatchedNode::node).collect(),
        Axis::AncestorOrSelf => std::iter::once(node)
            .chain(owner.ancestors().map(MatchedNode::node))
            .collect(),
        Axis::Following => owner
            .descendants()
            .skip(1)
            .map(MatchedNode::node)
            .chain(following(owner))
            .collect(),
        Axis::Preceding => preceding(owner),
        Axis::Child
        | Axis::Descendant
        | Axis::FollowingSibling
        | Axis::PrecedingSibling
        | Axis::Attribute => Vec::new(),
    }
}

/// Everything after `node` in document order, excluding its descendants.
fn following<'a, 'i: 'a>(node: roxmltree::Node<'a, 'i>) -> Vec<MatchedNode<'a, 'i>> {
    let mut out = Vec::new();
    for level in node.ancestors() {
        for sibling in successors(level.next_sibling(), |n| n.next_sibling()) {
            out.extend(sibling.descendants().map(MatchedNode::node));
        }
    }
    out
}

/// Everything before `node` in reverse document order, excluding ancestors.
fn preceding<'a, 'i: 'a>(node: roxmltree::Node<'a, 'i>) -> Vec<MatchedNode<'a, 'i>> {
    let mut out = Vec::new();
    for level in node.ancestors() {
        for sibling in successors(level.prev_sibling(), |n| n.prev_sibling()) {
            let subtree: Vec<_> = sibling.descendants().collect();
            out.extend(subtree.into_iter().rev().map(MatchedNode::node));
        }
    }
    out
}

fn matches_test(node: &MatchedNode<'_, '_>, test: &NodeTest, axis: Axis) -> bool {
    let principal = if axis == Axis::Attribute {
        NodeKind::Attribute
    } else {
        NodeKind::Element
    };

    match test {
        NodeTest::AnyName => node.kind() == principal,
        NodeTest::Name(name) => node.kind() == principal && node.local_name() == name,
        NodeTest::Node => true,
        NodeTest::Text => node.kind() == NodeKind::Text,
        NodeTest::Comment => node.kind() == NodeKind::Comment,
        NodeTest::ProcessingInstruction(target) => {
            node.kind() == NodeKind::ProcessingInstruction
                && target.as_deref().map_or(true, |t| node.local_name() == t)
        }
    }
}

fn compare(op: CompareOp, lhs: &Value<'_, '_>, rhs: &Value<'_, '_>) -> bool {
    match (lhs, rhs) {
        (Value::Nodes(a), Value::Nodes(b)) => a.iter().any(|x| {
            let x = Value::String(x.text_content());
            b.iter()
                .any(|y| compare_atomic(op, &x, &Value::String(y.text_content())))
        }),
        (Value::Nodes(a), Value::Boolean(_)) => {
            compare_atomic(op, &Value::Boolean(!a.is_empty()), rhs)
        }
        (Value::Boolean(_), Value::Nodes(b)) => {
            compare_atomic(op, lhs, &Value::Boolean(!b.is_empty()))
        }
        (Value::Nodes(a), _) => a
            .iter()
            .any(|x| compare_atomic(op, &Value::String(x.text_content()), rhs)),
        (_, Value::Nodes(b)) => b
            .iter()
            .any(|y| compare_atomic(op, lhs, &Value::String(y.text_content()))),
        _ => compare_atomic(op, lhs, rhs),
    }
}

fn compare_atomic(op: CompareOp, lhs: &Value<'_, '_>, rhs: &Value<'_, '_>) -> bool {
    match op {
        CompareOp::Eq | CompareOp::NotEq => {
            let equal = if matches!(lhs, Value::Boolean(_)) || matches!(rhs, Value::Boolean(_)) {
                lhs.to_bool() == rhs.to_bool()
            } else if matches!(lhs, Value::Number(_)) || matches!(rhs, Value::Number(_)) {
                lhs.to_number() == rhs.to_number()
            } else {
                lhs.to_string_value() == rhs.to_string_value()
            };
            equal == (op == CompareOp::Eq)
        }
        CompareOp::Lt => lhs.to_number() < rhs.to_number(),
        CompareOp::LtEq => lhs.to_number() <= rhs.to_number(),
        CompareOp::Gt => lhs.to_number() > rhs.to_number(),
        CompareOp::GtEq => lhs.to_number() >= rhs.to_number(),
    }
}

fn call<'a, 'i: 'a>(function: Function, args: &[Expr], ctx: &Context<'a, 'i>) -> Value<'a, 'i> {
    let string_arg = |index: usize| eval(&args[index], ctx).to_string_value();
    let number_arg = |index: usize| eval(&args[index], ctx).to_number();
    // Node-set argument, or the context node when omitted
    let first_node = || match args.first() {
        Some(arg) => eval(arg, ctx).into_nodes().into_iter().next(),
        None => Some(ctx.node),
    };
    // String argument, or the context node's string value when omitted
    let string_or_context = || match args.first() {
        Some(arg) => eval(arg, ctx).to_string_value(),
        None => ctx.node.text_content(),
    };

    match function {
        Function::Last => Value::Number(ctx.size as f64),
        Function::Position => Value::Number(ctx.position as f64),
        Function::Count => Value::Number(eval(&args[0], ctx).into_nodes().len() as f64),
        Function::LocalName => Value::String(
            first_node()
                .map(|n| n.local_name().to_string())
                .unwrap_or_default(),
        ),
        Function::NamespaceUri => Value::String(
            first_node()
                .map(|n| n.namespace_uri().to_string())
                .unwrap_or_default(),
        ),
        Function::Name => Value::String(first_node().map(|n| n.qualified_name()).unwrap_or_default()),
        Function::String => Value::String(string_or_context()),
        Function::Concat => Value::String((0..args.len()).map(&string_arg).collect()),
        Function::StartsWith => Value::Boolean(string_arg(0).starts_with(&string_arg(1))),
        Function::Contains => Value::Boolean(string_arg(0).contains(&string_arg(1))),
        Function::SubstringBefore => {
            let (haystack, needle) = (string_arg(0), string_arg(1));
            Value::String(
                haystack
                    .find(&needle)
                    .map(|at| haystack[..at].to_string())
                    .unwrap_or_default(),
            )
        }
        Function::SubstringAfter => {
            let (haystack, needle) = (string_arg(0), string_arg(1));
            Value::String(
                haystack
                    .find(&needle)
                    .map(|at| haystack[at + needle.len()..].to_string())
                    .unwrap_or_default(),
            )
        }
        Function::Substring => {
            let length = (args.len() == 3).then(|| number_arg(2));
            Value::String(substring(&string_arg(0), number_arg(1), length))
        }
        Function::StringLength => Value::Number(string_or_context().chars().count() as f64),
        Function::NormalizeSpace => Value::String(
            string_or_context()
                .split(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Function::Translate => {
            let from: Vec<char> = string_arg(1).chars().collect();
            let to: Vec<char> = string_arg(2).chars().collect();
            Value::String(
                string_arg(0)
                    .chars()
                    .filter_map(|c| match from.iter().position(|&f| f == c) {
                        Some(index) => to.get(index).copied(),
                        None => Some(c),
                    })
                    .collect(),
            )
        }
        Function::Boolean => Value::Boolean(eval(&args[0], ctx).to_bool()),
        Function::Not => Value::Boolean(!eval(&args[0], ctx).to_bool()),
        Function::True => Value::Boolean(true),
        Function::False => Value::Boolean(false),
        Function::Number => match args.first() {
            Some(arg) => Value::Number(eval(arg, ctx).to_number()),
            None => Value::Number(parse_number(&ctx.node.text_content())),
        },
        Function::Sum => Value::Number(
            eval(&args[0], ctx)
                .into_nodes()
                .iter()
                .map(|n| parse_number(&n.text_content()))
                .sum(),
        ),
        Function::Floor => Value::Number(number_arg(0).floor()),
        Function::Ceiling => Value::Number(number_arg(0).ceil()),
        Function::Round => Value::Number(round(number_arg(0))),
    }
}

fn round(n: f64) -> f64 {
    if n.is_finite() {
        (n + 0.5).floor()
    } else {
        n
    }
}

fn substring(value: &str, start: f64, length: Option<f64>) -> String {
    let first = round(start);
    let end = length.map(|len| first + round(len));
    value
        .chars()
        .enumerate()
        .filter(|&(index, _)| {
            let position = (index + 1) as f64;
            position >= first && end.map_or(true, |end| position < end)
        })
        .map(|(_, c)| c)
        .collect()
}

/// XPath `number()` on a string: optional minus, digits, optional fraction.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'));
    let unsigned = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let valid = unsigned.chars().any(|c| c.is_ascii_digit())
        && unsigned.chars().all(|c| c.is_ascii_digit() || c == '.')
        && unsigned.matches('.').count() <= 1;
    if !valid {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}
