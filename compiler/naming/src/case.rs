//! Canonical-name to target-identifier conversion

use types::{AcronymStyle, CaseStyle, IdentifierKind, TargetLanguageProfile};

/// Identifier used when a canonical name has no alphanumeric content.
const FALLBACK: &str = "unnamed";

/// Split a canonical name into words.
///
/// Non-alphanumeric characters separate words; a lower-to-upper transition
/// starts a new word; digits stay attached to the word before them. A run of
/// upper-case letters is one word unless it can be split entirely into known
/// acronyms (`NAGURL` becomes `NAG`, `URL`).
///
/// ```
/// assert_eq!(naming::tokenize("setNAGURL", &["NAG", "URL"]), ["set", "NAG", "URL"]);
/// assert_eq!(naming::tokenize("getTransactionbyID", &["ID"]), ["get", "Transactionby", "ID"]);
/// assert_eq!(naming::tokenize("hex_fix", &[]), ["hex", "fix"]);
/// ```
pub fn tokenize(name: &str, acronyms: &[&str]) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        if !chunk.is_empty() {
            split_chunk(chunk, acronyms, &mut tokens);
        }
    }
    tokens
}

fn split_chunk(chunk: &str, acronyms: &[&str], out: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if !c.is_ascii_uppercase() {
            current.push(c);
            i += 1;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        let mut end = i;
        while end < chars.len() && chars[end].is_ascii_uppercase() {
            end += 1;
        }
        let run_len = end - i;
        let followed_by_lower = chars.get(end).is_some_and(|c| c.is_ascii_lowercase());

        if run_len == 1 {
            current.push(c);
            i += 1;
        } else if followed_by_lower {
            // The last capital starts the next word.
            push_upper_run(&chars[i..end - 1].iter().collect::<String>(), acronyms, out);
            i = end - 1;
        } else {
            let mut word: String = chars[i..end].iter().collect();
            while end < chars.len() && chars[end].is_ascii_digit() {
                word.push(chars[end]);
                end += 1;
            }
            push_upper_run(&word, acronyms, out);
            i = end;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
}

fn push_upper_run(run: &str, acronyms: &[&str], out: &mut Vec<String>) {
    match split_acronyms(run, acronyms) {
        Some(parts) if parts.len() > 1 => out.extend(parts),
        _ => out.push(run.to_string()),
    }
}

/// Greedy longest-first split of `run` into known acronyms.
fn split_acronyms(run: &str, acronyms: &[&str]) -> Option<Vec<String>> {
    let mut sorted: Vec<&str> = acronyms.to_vec();
    sorted.sort_by_key(|a| std::cmp::Reverse(a.len()));

    let mut parts = Vec::new();
    let mut rest = run;
    while !rest.is_empty() {
        let hit = sorted.iter().find(|a| {
            rest.len() >= a.len() && rest.is_char_boundary(a.len()) && rest[..a.len()].eq_ignore_ascii_case(a)
        })?;
        parts.push(rest[..hit.len()].to_string());
        rest = &rest[hit.len()..];
    }
    Some(parts)
}

fn capitalize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
    }
}

fn is_acronym_like(token: &str, profile: &TargetLanguageProfile) -> bool {
    profile.acronym(token).is_some()
        || (token.len() >= 2
            && token.chars().any(|c| c.is_ascii_alphabetic())
            && token.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()))
}

fn word_case(token: &str, profile: &TargetLanguageProfile) -> String {
    if is_acronym_like(token, profile) {
        match profile.acronym_style {
            AcronymStyle::Preserve => token.to_ascii_uppercase(),
            AcronymStyle::Capitalize => capitalize(token),
        }
    } else {
        capitalize(token)
    }
}

fn render(tokens: &[String], style: CaseStyle, profile: &TargetLanguageProfile) -> String {
    match style {
        CaseStyle::Snake =>
            tokens.iter().map(|t| t.to_ascii_lowercase()).collect::<Vec<_>>().join("_"),
        CaseStyle::ScreamingSnake =>
            tokens.iter().map(|t| t.to_ascii_uppercase()).collect::<Vec<_>>().join("_"),
        CaseStyle::Pascal => tokens.iter().map(|t| word_case(t, profile)).collect(),
        CaseStyle::Camel => tokens
            .iter()
            .enumerate()
            .map(|(i, t)| if i == 0 { t.to_ascii_lowercase() } else { word_case(t, profile) })
            .collect(),
    }
}

/// Map a canonical name to an identifier of `kind` in the profile's target.
///
/// Deterministic, idempotent (`map_name(map_name(n)) == map_name(n)`), and the
/// result always satisfies [`is_valid_identifier`].
pub fn map_name(canonical: &str, kind: IdentifierKind, profile: &TargetLanguageProfile) -> String {
    let mut ident = map_once(canonical, kind, profile);
    // Adjacent one-letter words can merge when re-tokenized; settle on the fixed point.
    for _ in 0..4 {
        let next = map_once(&ident, kind, profile);
        if next == ident {
            break;
        }
        ident = next;
    }
    ident
}

fn map_once(canonical: &str, kind: IdentifierKind, profile: &TargetLanguageProfile) -> String {
    let mut tokens = tokenize(canonical, profile.acronyms);
    if tokens.is_empty() {
        tokens.push(FALLBACK.to_string());
    }
    if tokens[0].starts_with(|c: char| c.is_ascii_digit()) {
        tokens.insert(0, profile.leading_prefix.to_string());
    }

    let ident = render(&tokens, profile.naming.style(kind), profile);
    if profile.is_reserved(&ident) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Whether `ident` is a syntactically valid, non-reserved identifier in the profile's target.
pub fn is_valid_identifier(ident: &str, profile: &TargetLanguageProfile) -> bool {
    let mut chars = ident.chars();
    let head_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && !profile.is_reserved(ident)
}
