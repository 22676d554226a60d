/// Turn textual escape sequences left in model output into literal characters.
///
/// Handles `\"`, `\'`, `\\`, `\/`, `\n`, `\r`, `\t` and `\uXXXX` (which covers the
/// `\u003c` / `\u003e` / `\u0026` forms models emit for angle brackets and `&`).
/// Unknown escapes are left untouched, backslash included.
pub fn unescape(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some('"') => push_and_skip(&mut out, &mut chars, '"'),
            Some('\'') => push_and_skip(&mut out, &mut chars, '\''),
            Some('\\') => push_and_skip(&mut out, &mut chars, '\\'),
            Some('/') => push_and_skip(&mut out, &mut chars, '/'),
            Some('n') => push_and_skip(&mut out, &mut chars, '\n'),
            Some('r') => push_and_skip(&mut out, &mut chars, '\r'),
            Some('t') => push_and_skip(&mut out, &mut chars, '\t'),
            Some('u') => {
                let hex: String = chars.clone().skip(1).take(4).collect();
                let decoded = if hex.len() == 4 {
                    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(c) => {
                        out.push(c);
                        // 'u' plus four hex digits
                        for _ in 0..5 {
                            chars.next();
                        }
                    }
                    None => out.push('\\'),
                }
            }
            _ => out.push('\\'),
        }
    }

    out
}

fn push_and_skip(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    literal: char,
) {
    out.push(literal);
    chars.next();
}
