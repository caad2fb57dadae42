//! fnmatch-style patterns over `/`-separated relative paths.
//!
//! `*` matches any run of characters including `/`, so `*.h` selects headers
//! at every depth. `?` matches one character and `[...]` / `[!...]` match a
//! character class with optional `a-z` ranges.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Literal(char),
  AnyOne,
  AnyRun,
  Class { negated: bool, items: Vec<ClassItem> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
  Char(char),
  Range(char, char),
}

impl ClassItem {
  fn contains(&self, c: char) -> bool {
    match *self {
      ClassItem::Char(x) => x == c,
      ClassItem::Range(lo, hi) => lo <= c && c <= hi,
    }
  }
}

/// A compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
  source: String,
  tokens: Vec<Token>,
}

impl Pattern {
  pub fn new(pattern: &str) -> Self {
    Self {
      source: pattern.to_string(),
      tokens: tokenize(pattern),
    }
  }

  pub fn as_str(&self) -> &str {
    &self.source
  }

  /// Match a relative path. Backslashes are treated as separators.
  pub fn matches(&self, path: &str) -> bool {
    let text: Vec<char> = path.chars().map(|c| if c == '\\' { '/' } else { c }).collect();
    match_tokens(&self.tokens, &text)
  }
}

impl std::fmt::Display for Pattern {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.source)
  }
}

fn tokenize(pattern: &str) -> Vec<Token> {
  let chars: Vec<char> = pattern.chars().collect();
  let mut tokens = Vec::new();
  let mut i = 0;

  while i < chars.len() {
    match chars[i] {
      '*' => {
        // Consecutive stars behave like one.
        if tokens.last() != Some(&Token::AnyRun) {
          tokens.push(Token::AnyRun);
        }
        i += 1;
      }
      '?' => {
        tokens.push(Token::AnyOne);
        i += 1;
      }
      '[' => match parse_class(&chars, i + 1) {
        Some((token, next)) => {
          tokens.push(token);
          i = next;
        }
        // An unterminated class is a literal bracket.
        None => {
          tokens.push(Token::Literal('['));
          i += 1;
        }
      },
      c => {
        tokens.push(Token::Literal(c));
        i += 1;
      }
    }
  }

  tokens
}

/// Parse a class body starting just after `[`. Returns the token and the
/// index after the closing `]`.
fn parse_class(chars: &[char], start: usize) -> Option<(Token, usize)> {
  let mut i = start;
  let negated = matches!(chars.get(i), Some('!') | Some('^'));
  if negated {
    i += 1;
  }

  let mut items = Vec::new();
  let mut first = true;
  while i < chars.len() {
    let c = chars[i];
    // A `]` right after the opening bracket is a member, not the terminator.
    if c == ']' && !first {
      return Some((Token::Class { negated, items }, i + 1));
    }
    first = false;

    if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|&hi| hi != ']') {
      items.push(ClassItem::Range(c, chars[i + 2]));
      i += 3;
    } else {
      items.push(ClassItem::Char(c));
      i += 1;
    }
  }

  None
}

/// Iterative wildcard matching with single-star backtracking.
fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
  let (mut t, mut s) = (0, 0);
  let mut backtrack: Option<(usize, usize)> = None;

  while s < text.len() {
    let step = match tokens.get(t) {
      Some(Token::AnyRun) => {
        backtrack = Some((t, s));
        t += 1;
        continue;
      }
      Some(Token::AnyOne) => true,
      Some(Token::Literal(c)) => *c == text[s],
      Some(Token::Class { negated, items }) => items.iter().any(|item| item.contains(text[s])) != *negated,
      None => false,
    };

    if step {
      t += 1;
      s += 1;
    } else if let Some((star_t, star_s)) = backtrack {
      // Let the last star swallow one more character and retry.
      t = star_t + 1;
      s = star_s + 1;
      backtrack = Some((star_t, star_s + 1));
    } else {
      return false;
    }
  }

  tokens[t..].iter().all(|token| *token == Token::AnyRun)
}
