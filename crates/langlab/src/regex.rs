//! Regex translation: implicit concatenation, then infix to postfix.

use crate::symbol::{priority, CLOSURE, CONCAT, GROUP_LEFT, GROUP_RIGHT, UNION};

/// Insert an explicit `·` between adjacent tokens, e.g. `(a|b)*a` becomes
/// `(a|b)*·a`. No separator is inserted after `(`/`|`, before `*`/`)`/`|`,
/// or next to an already explicit `·`.
fn insert_concat(pattern: &str) -> String {
    let tokens: Vec<char> = pattern.chars().collect();
    let mut output = String::new();
    for (i, &token) in tokens.iter().enumerate() {
        output.push(token);
        if token == GROUP_LEFT || token == UNION || token == CONCAT {
            continue;
        }
        if let Some(&next) = tokens.get(i + 1) {
            if matches!(next, CLOSURE | GROUP_RIGHT | UNION | CONCAT) {
                continue;
            }
            output.push(CONCAT);
        }
    }
    output
}

/// Shunting-yard conversion with priority `|` < `·` < `*`. A `)` pops and
/// emits until the matching `(` is discarded. Unmatched grouping is not
/// detected here; a leftover `(`/`)` reaches the NFA builder and fails there.
fn to_postfix(pattern: &str) -> String {
    let mut output = String::new();
    let mut stack: Vec<char> = vec![];
    for token in pattern.chars() {
        match token {
            GROUP_RIGHT => {
                while let Some(&top) = stack.last() {
                    if top == GROUP_LEFT {
                        break;
                    }
                    output.push(top);
                    stack.pop();
                }
                stack.pop();
            }
            UNION | CONCAT | CLOSURE => {
                while let Some(&top) = stack.last() {
                    match (priority(top), priority(token)) {
                        (Some(p), Some(q)) if p >= q => {
                            output.push(top);
                            stack.pop();
                        }
                        _ => break,
                    }
                }
                stack.push(token);
            }
            GROUP_LEFT => stack.push(token),
            literal => output.push(literal),
        }
    }
    while let Some(top) = stack.pop() {
        output.push(top);
    }
    output
}

/// Translate an infix pattern into its postfix form.
pub fn translate(pattern: &str) -> String {
    to_postfix(&insert_concat(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_insertion() {
        assert_eq!(insert_concat("ab"), "a·b");
        assert_eq!(insert_concat("(a|b)*a"), "(a|b)*·a");
        assert_eq!(insert_concat("a|b*"), "a|b*");
        // explicit separators in the input are left alone
        assert_eq!(insert_concat("a·b|c*"), "a·b|c*");
    }

    #[test]
    fn postfix_conversion() {
        assert_eq!(translate("ab"), "ab·");
        assert_eq!(translate("a|b*"), "ab*|");
        assert_eq!(translate("(a|b)*a"), "ab|*a·");
        assert_eq!(translate("a·b|c*"), "ab·c*|");
    }

    #[test]
    fn unmatched_group_falls_through() {
        // the stray `(` is flushed into the output for the builder to reject
        assert_eq!(translate("(a"), "a(");
    }
}
