//! Python comment and docstring removal
//!
//! `#` comments are removed unless the hash sits inside a string literal or
//! directly follows a backslash. A triple-quoted string is treated as a
//! docstring only when it stands alone as a statement: first thing on its
//! line, outside any brackets, not continuing an expression, nothing but
//! whitespace or a comment after it, and not an f-string. Everything else
//! (assignments, call arguments, f-strings) is kept verbatim.

const PREFIX_CHARS: &[char] = &['r', 'R', 'b', 'B', 'u', 'U', 'f', 'F'];

/// Characters that leave an expression open when they end a line
const CONTINUATION_CHARS: &[char] = &[
    '=', '(', '[', '{', ',', '\\', '+', '-', '*', '/', '%', '&', '|', '^', '<', '>', '.', '~',
];

fn starts_with_at(chars: &[char], i: usize, token: &[char]) -> bool {
    chars.len() >= i + token.len() && chars[i..i + token.len()] == *token
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// If a string literal starts at `i`, return `(prefix_len, quote_char)`
fn string_start(chars: &[char], i: usize) -> Option<(usize, char)> {
    let c = chars[i];
    if c == '"' || c == '\'' {
        return Some((0, c));
    }
    if !PREFIX_CHARS.contains(&c) || (i > 0 && is_ident_char(chars[i - 1])) {
        return None;
    }
    let mut k = 0;
    while k < 2 && i + k < chars.len() && PREFIX_CHARS.contains(&chars[i + k]) {
        k += 1;
    }
    match chars.get(i + k) {
        Some(&q) if q == '"' || q == '\'' => Some((k, q)),
        _ => None,
    }
}

/// Index just past the literal whose opening quote is at `q_start`.
///
/// Only the opening delimiter closes the literal, so `'''` strings may freely
/// contain `"""` and vice versa. Single-quoted literals end at a newline.
fn string_end(chars: &[char], q_start: usize, quote: char, triple: bool) -> usize {
    let delim = [quote; 3];
    let mut j = q_start + if triple { 3 } else { 1 };
    while j < chars.len() {
        let c = chars[j];
        if c == '\\' {
            j += 2;
            continue;
        }
        if triple {
            if starts_with_at(chars, j, &delim) {
                return j + 3;
            }
        } else if c == quote {
            return j + 1;
        } else if c == '\n' {
            return j;
        }
        j += 1;
    }
    chars.len()
}

fn current_line_is_blank(out: &str) -> bool {
    let line = match out.rfind('\n') {
        Some(pos) => &out[pos + 1..],
        None => out,
    };
    line.chars().all(char::is_whitespace)
}

fn rest_of_line_is_blank(chars: &[char], from: usize) -> bool {
    let mut j = from;
    while j < chars.len() && (chars[j] == ' ' || chars[j] == '\t') {
        j += 1;
    }
    matches!(chars.get(j), None | Some('\n') | Some('\r') | Some('#'))
}

/// Strip comments and docstrings from Python source
pub fn strip_comments(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    let mut out = String::with_capacity(content.len());
    let mut depth = 0usize;
    let mut last_code: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '#' {
            if i > 0 && chars[i - 1] == '\\' {
                out.push(c);
                last_code = Some(c);
                i += 1;
                continue;
            }
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        if let Some((prefix_len, quote)) = string_start(&chars, i) {
            let q_start = i + prefix_len;
            let triple = starts_with_at(&chars, q_start, &[quote; 3]);
            let end = string_end(&chars, q_start, quote, triple);
            let is_fstring = chars[i..q_start].iter().any(|p| *p == 'f' || *p == 'F');
            let continues_expr = last_code.is_some_and(|lc| CONTINUATION_CHARS.contains(&lc));

            if triple
                && !is_fstring
                && depth == 0
                && !continues_expr
                && current_line_is_blank(&out)
                && rest_of_line_is_blank(&chars, end)
            {
                // Drop the docstring together with its line
                let keep = out.rfind('\n').map(|p| p + 1).unwrap_or(0);
                out.truncate(keep);
                i = end;
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                if i < chars.len() {
                    i += 1;
                }
                continue;
            }

            out.extend(&chars[i..end]);
            last_code = Some(quote);
            i = end;
            continue;
        }

        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if !c.is_whitespace() {
            last_code = Some(c);
        }
        out.push(c);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_inside_string_is_kept() {
        let input = r#"x = "text with # not a comment""#;
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_line_comment_removed() {
        let input = "x = 1  # set x\n# full line\ny = 2\n";
        assert_eq!(strip_comments(input), "x = 1  \n\ny = 2\n");
    }

    #[test]
    fn test_docstring_after_def_removed() {
        let input = "def foo():\n    '''doc'''\n    return 1\n";
        assert_eq!(strip_comments(input), "def foo():\n    return 1\n");
    }

    #[test]
    fn test_multiline_docstring_removed() {
        let input = "class A:\n    \"\"\"\n    Summary.\n\n    Details # here\n    \"\"\"\n    x = 1\n";
        assert_eq!(strip_comments(input), "class A:\n    x = 1\n");
    }

    #[test]
    fn test_module_docstring_removed() {
        let input = "\"\"\"Module doc.\"\"\"\nimport os\n";
        assert_eq!(strip_comments(input), "import os\n");
    }

    #[test]
    fn test_assigned_triple_quote_kept() {
        let input = "SQL = \"\"\"\nSELECT * -- all\nFROM t # keep\n\"\"\"\n";
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_triple_quote_on_continuation_line_kept() {
        let input = "x = \\\n    '''kept'''\ny = (\n    \"\"\"also kept\"\"\"\n)\n";
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_nested_differing_triple_quotes() {
        let input = "def f():\n    '''He said \"\"\"hi\"\"\" to me'''\n    s = '''a \"\"\"b\"\"\" c'''\n";
        assert_eq!(
            strip_comments(input),
            "def f():\n    s = '''a \"\"\"b\"\"\" c'''\n"
        );
    }

    #[test]
    fn test_fstring_triple_quotes_preserved() {
        let input = "def f(x):\n    f\"\"\"value {x} # not a comment\"\"\"\n    return f'''{x}'''\n";
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_escaped_hash_not_a_comment() {
        let input = "print(1) \\# kept\n";
        assert_eq!(strip_comments(input), input);
    }

    #[test]
    fn test_prefixed_strings() {
        let input = "p = r'\\d+ # raw'\nb = rb\"#bytes\"  # gone\n";
        assert_eq!(strip_comments(input), "p = r'\\d+ # raw'\nb = rb\"#bytes\"  \n");
    }

    #[test]
    fn test_identifier_ending_in_prefix_letter() {
        // `buf` ends with f but is not a string prefix
        let input = "buf = 1 # c\nif buf: pass\n";
        assert_eq!(strip_comments(input), "buf = 1 \nif buf: pass\n");
    }

    #[test]
    fn test_docstring_with_trailing_comment() {
        let input = "def g():\n    \"\"\"doc\"\"\"  # note\n    pass\n";
        assert_eq!(strip_comments(input), "def g():\n    pass\n");
    }
}
