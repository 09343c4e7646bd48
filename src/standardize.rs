// ABOUTME: Bottom-up rewrite of the parser's AST into the canonical standardized form

use crate::error::RpalError;
use crate::tree::Tree;

/// Standardizes a parse tree per the rewrite table (§4.1): children are
/// standardized first, then the node's own label determines the rewrite.
/// Any label not covered by the table is returned unchanged.
pub fn standardize(tree: Tree) -> Result<Tree, RpalError> {
    let Tree {
        label,
        value,
        children,
    } = tree;

    let children = children
        .into_iter()
        .map(standardize)
        .collect::<Result<Vec<_>, _>>()?;

    match label.as_str() {
        "let" => standardize_let(children),
        "where" => standardize_where(children),
        "fcn_form" => standardize_fcn_form(children),
        "lambda" => standardize_lambda(children),
        "within" => standardize_within(children),
        "@" => standardize_at(children),
        "and" => standardize_and(children),
        "rec" => standardize_rec(children),
        _ => Ok(Tree {
            label,
            value,
            children,
        }),
    }
}

fn require(children: &[Tree], n: usize, label: &str) -> Result<(), RpalError> {
    if children.len() != n {
        return Err(RpalError::StandardizationError(format!(
            "{} expects {} children, got {}",
            label,
            n,
            children.len()
        )));
    }
    Ok(())
}

// let X = E in P  ->  gamma(lambda(X, P), E)
fn standardize_let(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    require(&children, 2, "let")?;
    let p = children.pop().unwrap();
    let eq = children.pop().unwrap();
    if eq.label != "=" || eq.children.len() != 2 {
        return Err(RpalError::StandardizationError(
            "let's declaration must be an '=' binding".to_string(),
        ));
    }
    let mut eq_children = eq.children;
    let e = eq_children.pop().unwrap();
    let x = eq_children.pop().unwrap();
    let lambda = Tree::node("lambda", vec![x, p]);
    Ok(Tree::node("gamma", vec![lambda, e]))
}

// P where X = E  ->  gamma(lambda(X, P), E)
fn standardize_where(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    require(&children, 2, "where")?;
    let eq = children.pop().unwrap();
    let p = children.pop().unwrap();
    if eq.label != "=" || eq.children.len() != 2 {
        return Err(RpalError::StandardizationError(
            "where's declaration must be an '=' binding".to_string(),
        ));
    }
    let mut eq_children = eq.children;
    let e = eq_children.pop().unwrap();
    let x = eq_children.pop().unwrap();
    let lambda = Tree::node("lambda", vec![x, p]);
    Ok(Tree::node("gamma", vec![lambda, e]))
}

// fcn_form F V1 .. Vn E  ->  =(F, lambda(V1, lambda(V2, .. lambda(Vn, E)..)))
fn standardize_fcn_form(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    if children.len() < 3 {
        return Err(RpalError::StandardizationError(
            "fcn_form expects a name, at least one parameter, and a body".to_string(),
        ));
    }
    let e = children.pop().unwrap();
    let f = children.remove(0);
    let body = curry_lambdas(children, e);
    Ok(Tree::node("=", vec![f, body]))
}

fn curry_lambdas(mut vars: Vec<Tree>, body: Tree) -> Tree {
    match vars.pop() {
        None => body,
        Some(last) => {
            let inner = curry_lambdas(vars, body);
            Tree::node("lambda", vec![last, inner])
        }
    }
}

// lambda V1 V2 .. Vn E (non-comma Vi, n>=2) -> lambda(V1, lambda(V2, .. lambda(Vn, E)..))
// A comma-parameter lambda (single ','-labeled bound-variable spec) is left untouched.
fn standardize_lambda(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    if children.len() < 2 {
        return Err(RpalError::StandardizationError(
            "lambda expects at least one parameter and a body".to_string(),
        ));
    }
    if children.len() == 2 {
        return Ok(Tree::node("lambda", children));
    }
    let e = children.pop().unwrap();
    Ok(curry_lambdas(children, e))
}

// within (= X1 E1) (= X2 E2)  ->  =(X2, gamma(lambda(X1, E2), E1))
fn standardize_within(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    require(&children, 2, "within")?;
    let second = children.pop().unwrap();
    let first = children.pop().unwrap();
    if first.label != "=" || first.children.len() != 2 || second.label != "=" || second.children.len() != 2 {
        return Err(RpalError::StandardizationError(
            "within expects two '=' declarations".to_string(),
        ));
    }
    let mut first_children = first.children;
    let e1 = first_children.pop().unwrap();
    let x1 = first_children.pop().unwrap();
    let mut second_children = second.children;
    let e2 = second_children.pop().unwrap();
    let x2 = second_children.pop().unwrap();
    let lambda = Tree::node("lambda", vec![x1, e2]);
    let gamma = Tree::node("gamma", vec![lambda, e1]);
    Ok(Tree::node("=", vec![x2, gamma]))
}

// @ E1 N E2  ->  gamma(gamma(N, E1), E2)
fn standardize_at(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    require(&children, 3, "@")?;
    let e2 = children.pop().unwrap();
    let n = children.pop().unwrap();
    let e1 = children.pop().unwrap();
    let inner = Tree::node("gamma", vec![n, e1]);
    Ok(Tree::node("gamma", vec![inner, e2]))
}

// and (= X1 E1) .. (= Xn En)  ->  =(,(X1..Xn), tau(E1..En))
fn standardize_and(children: Vec<Tree>) -> Result<Tree, RpalError> {
    if children.len() < 2 {
        return Err(RpalError::StandardizationError(
            "and expects at least two declarations".to_string(),
        ));
    }
    let mut names = Vec::with_capacity(children.len());
    let mut exprs = Vec::with_capacity(children.len());
    for eq in children {
        if eq.label != "=" || eq.children.len() != 2 {
            return Err(RpalError::StandardizationError(
                "and's declarations must be '=' bindings".to_string(),
            ));
        }
        let mut eq_children = eq.children;
        let e = eq_children.pop().unwrap();
        let x = eq_children.pop().unwrap();
        names.push(x);
        exprs.push(e);
    }
    let comma = Tree::node(",", names);
    let tau = Tree::node("tau", exprs);
    Ok(Tree::node("=", vec![comma, tau]))
}

// rec (= X E)  ->  =(X, gamma(Y*, lambda(X, E)))
fn standardize_rec(mut children: Vec<Tree>) -> Result<Tree, RpalError> {
    require(&children, 1, "rec")?;
    let eq = children.pop().unwrap();
    if eq.label != "=" || eq.children.len() != 2 {
        return Err(RpalError::StandardizationError(
            "rec expects a single '=' declaration".to_string(),
        ));
    }
    let mut eq_children = eq.children;
    let e = eq_children.pop().unwrap();
    let x = eq_children.pop().unwrap();
    let lambda = Tree::node("lambda", vec![x.clone(), e]);
    let y_star = Tree::leaf("identifier", "Y*");
    let gamma = Tree::node("gamma", vec![y_star, lambda]);
    Ok(Tree::node("=", vec![x, gamma]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn let_becomes_gamma_lambda() {
        let tree = Tree::node(
            "let",
            vec![
                Tree::node(
                    "=",
                    vec![Tree::leaf("identifier", "x"), Tree::leaf("integer", "5")],
                ),
                Tree::node(
                    "gamma",
                    vec![Tree::leaf("identifier", "Print"), Tree::leaf("identifier", "x")],
                ),
            ],
        );
        let std = standardize(tree).unwrap();
        assert_eq!(std.label, "gamma");
        assert_eq!(std.children[0].label, "lambda");
        assert_eq!(std.children[1].label, "integer");
    }

    #[test]
    fn rec_introduces_y_star() {
        let tree = Tree::node(
            "rec",
            vec![Tree::node(
                "=",
                vec![Tree::leaf("identifier", "f"), Tree::leaf("integer", "1")],
            )],
        );
        let std = standardize(tree).unwrap();
        assert_eq!(std.label, "=");
        assert_eq!(std.children[1].label, "gamma");
        assert_eq!(std.children[1].children[0].value.as_deref(), Some("Y*"));
    }

    #[test]
    fn comma_lambda_is_not_curried() {
        let tree = Tree::node(
            "lambda",
            vec![
                Tree::node(",", vec![Tree::leaf("identifier", "x"), Tree::leaf("identifier", "y")]),
                Tree::leaf("integer", "1"),
            ],
        );
        let std = standardize(tree).unwrap();
        assert_eq!(std.label, "lambda");
        assert_eq!(std.children.len(), 2);
        assert_eq!(std.children[0].label, ",");
    }

    #[test]
    fn multi_param_lambda_curries() {
        let tree = Tree::node(
            "lambda",
            vec![
                Tree::leaf("identifier", "x"),
                Tree::leaf("identifier", "y"),
                Tree::leaf("integer", "1"),
            ],
        );
        let std = standardize(tree).unwrap();
        assert_eq!(std.label, "lambda");
        assert_eq!(std.children[0].value.as_deref(), Some("x"));
        assert_eq!(std.children[1].label, "lambda");
        assert_eq!(std.children[1].children[0].value.as_deref(), Some("y"));
    }
}
